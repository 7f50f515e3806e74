use thiserror::Error;

/// Validation rejections for the public session operations. None of these
/// mutate any state; invariant breakage is a bug, not an error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("need exactly 10 players, got {0}")]
    InvalidPlayerCount(usize),
    #[error("invalid players")]
    InvalidPlayers,
    #[error("no active round")]
    NoActiveRound,
    #[error("not your turn")]
    NotYourTurn,
    #[error("invalid name")]
    InvalidName,
    #[error("name taken")]
    NameTaken,
    #[error("session is full")]
    SessionFull,
}
