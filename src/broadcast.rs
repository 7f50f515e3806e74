use crate::game::event::RoundEvent;
use crate::game::role::Role;
use crate::game::CatchOutcome;

pub mod channel_broadcast;

/// Public per-player view. `role` is revealed only while the player holds
/// the turn; everyone else's stays hidden until the round summary.
#[derive(Clone, Debug)]
pub struct PlayerView {
    pub name: String,
    pub score: u64,
    pub inactive: bool,
    pub is_admin: bool,
    pub role: Option<Role>,
}

#[derive(Clone, Debug)]
pub struct Snapshot {
    pub round: u32,
    pub round_active: bool,
    pub players: Vec<PlayerView>,
    pub active_player: Option<String>,
    pub events: Vec<RoundEvent>,
}

#[derive(Clone, Debug)]
pub struct SummaryEntry {
    pub name: String,
    pub role: Option<Role>,
    pub score: u64,
}

#[derive(Clone, Debug)]
pub struct RoundSummary {
    pub round: u32,
    pub summary: Vec<SummaryEntry>,
}

#[derive(Clone, Debug)]
pub enum OutboundEvent {
    StateChanged(Snapshot),
    CatchResolved {
        catcher: String,
        target: String,
        outcome: CatchOutcome,
    },
    RoundSummary(RoundSummary),
    TimerTick {
        player: String,
        remaining_secs: u64,
    },
}

/// Outbound seam to whatever pushes state at clients. Wire delivery and
/// serialization live entirely with the implementor.
pub trait Broadcast: Send + Sync {
    fn send(&self, event: OutboundEvent);
}
