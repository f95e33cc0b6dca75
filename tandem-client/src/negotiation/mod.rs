mod command;
mod handle;
mod negotiator;
mod phase;
mod session;
mod worker;

pub use command::*;
pub use handle::*;
pub use negotiator::*;
pub use phase::*;

pub(crate) use worker::Internal;

/// Identifies one negotiation on a client. Bumped every time a pairing starts.
pub type Epoch = u64;
