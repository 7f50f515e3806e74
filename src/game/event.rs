#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    Lobby,
    Round,
    Catch,
    Timeout,
}

/// One line of the append-only round log. Plain text; any presentation
/// markup is the consumer's business.
#[derive(Clone, Debug)]
pub struct RoundEvent {
    pub kind: EventKind,
    pub message: String,
}
