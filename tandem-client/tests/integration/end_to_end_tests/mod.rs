mod test_two_engines_connect_through_server;
