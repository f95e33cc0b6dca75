mod test_skip_tears_down_and_repairs;
