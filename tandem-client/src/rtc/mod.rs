//! Transport and media backed by webrtc-rs.

mod rtc_transport;
mod synthetic_media;

pub use rtc_transport::*;
pub use synthetic_media::*;
