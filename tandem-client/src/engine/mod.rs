mod client_config;
mod client_engine;
mod client_handle;

pub use client_config::*;
pub use client_engine::*;
pub use client_handle::*;
