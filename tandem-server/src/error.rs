use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind or serve: {0}")]
    Io(#[from] std::io::Error),

    /// The matchmaker task has stopped and no longer accepts commands.
    #[error("matchmaker is not running")]
    MatchmakerGone,
}
