#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, derive_more::Display)]
pub struct PlayerId(pub u64);

/// A seat in the session. Scores accumulate across rounds; per-round
/// liveness lives on the round itself.
#[derive(Clone, Debug)]
pub struct Player {
    pub player_id: PlayerId,
    pub name: String,
    pub score: u64,
    pub is_admin: bool,
}
