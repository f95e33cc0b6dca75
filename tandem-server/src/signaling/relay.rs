/// What happened to one relayed handshake message.
///
/// Drops are never reported back to the sender; a missing target means its session is
/// already ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered,
    /// No live connection with the target id.
    DroppedUnknownTarget,
    /// The target is registered but its outbound queue is already closed.
    DroppedClosed,
}

impl RelayOutcome {
    pub fn is_delivered(self) -> bool {
        matches!(self, RelayOutcome::Delivered)
    }
}
