mod match_command;
mod match_state;
mod matchmaker;
mod matchmaker_handle;

pub use match_command::*;
pub use matchmaker::*;
pub use matchmaker_handle::*;
