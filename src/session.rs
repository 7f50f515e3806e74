use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::sync::Mutex;
use tokio::time::{interval, sleep};

use crate::broadcast::{
    Broadcast, OutboundEvent, PlayerView, RoundSummary, Snapshot, SummaryEntry,
};
use crate::error::GameError;
use crate::game::event::EventKind;
use crate::game::player::{Player, PlayerId};
use crate::game::role::{Role, ROLE_COUNT};
use crate::game::{CatchOutcome, Round};
use crate::scheduler::TurnScheduler;

/// The one shared session: roster, current round, the turn scheduler and
/// the outbound sink. All mutation goes through `SessionHandle`, one
/// external event at a time.
pub struct Session<B: Broadcast> {
    players: Vec<Player>,
    round: Round,
    scheduler: TurnScheduler,
    sink: Arc<B>,
    turn_duration: Duration,
    next_player_id: u64,
    turn_seq: u64,
}

impl<B: Broadcast> Session<B> {
    fn name_of(&self, player_id: PlayerId) -> Option<String> {
        self.players
            .iter()
            .find(|p| p.player_id == player_id)
            .map(|p| p.name.clone())
    }

    fn snapshot(&self) -> Snapshot {
        let active = self.round.active_player();
        Snapshot {
            round: self.round.round,
            round_active: self.round.round_active(),
            players: self
                .players
                .iter()
                .map(|p| PlayerView {
                    name: p.name.clone(),
                    score: p.score,
                    inactive: self.round.is_inactive(p.player_id),
                    is_admin: p.is_admin,
                    // only the turn holder's role is public
                    role: if active == Some(p.player_id) {
                        self.round.role_of(p.player_id)
                    } else {
                        None
                    },
                })
                .collect::<Vec<_>>(),
            active_player: active.and_then(|id| self.name_of(id)),
            events: self.round.events().to_vec(),
        }
    }

    fn summary(&self) -> RoundSummary {
        RoundSummary {
            round: self.round.round,
            summary: self
                .players
                .iter()
                .map(|p| SummaryEntry {
                    name: p.name.clone(),
                    role: self.round.role_of(p.player_id),
                    score: p.score,
                })
                .collect::<Vec<_>>(),
        }
    }

    fn emit_state(&self) {
        self.sink.send(OutboundEvent::StateChanged(self.snapshot()));
    }

    fn emit_summary(&self) {
        self.sink.send(OutboundEvent::RoundSummary(self.summary()));
    }
}

/// Cloneable entry point; timer tasks re-enter through a clone of this.
pub struct SessionHandle<B: Broadcast> {
    inner: Arc<Mutex<Session<B>>>,
}

impl<B: Broadcast> Clone for SessionHandle<B> {
    fn clone(&self) -> SessionHandle<B> {
        SessionHandle {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Broadcast + 'static> SessionHandle<B> {
    pub fn new(sink: B, turn_duration: Duration) -> SessionHandle<B> {
        SessionHandle {
            inner: Arc::new(Mutex::new(Session {
                players: Vec::new(),
                round: Round::new(),
                scheduler: TurnScheduler::new(),
                sink: Arc::new(sink),
                turn_duration,
                next_player_id: 1,
                turn_seq: 0,
            })),
        }
    }

    /// Adds a player to the roster. The first joiner takes the admin seat.
    pub async fn join(&self, name: &str) -> Result<PlayerId, GameError> {
        let mut session = self.inner.lock().await;

        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::InvalidName);
        }
        if session.players.iter().any(|p| p.name == name) {
            return Err(GameError::NameTaken);
        }
        if session.players.len() >= ROLE_COUNT {
            return Err(GameError::SessionFull);
        }

        let player_id = PlayerId(session.next_player_id);
        session.next_player_id += 1;
        let is_admin = session.players.is_empty();
        session.players.push(Player {
            player_id,
            name: name.to_string(),
            score: 0,
            is_admin,
        });
        let message = format!("{} joined", name);
        session.round.record(EventKind::Lobby, message);
        info!("{} joined as player {}", name, player_id);

        session.emit_state();
        Ok(player_id)
    }

    /// Deals a fresh round over exactly ten players and hands the first
    /// turn to whoever drew the Raja.
    pub async fn start_round(&self) -> Result<Snapshot, GameError> {
        let mut session = self.inner.lock().await;

        if session.players.len() != ROLE_COUNT {
            return Err(GameError::InvalidPlayerCount(session.players.len()));
        }

        session.scheduler.cancel();
        {
            let Session { round, players, .. } = &mut *session;
            round.assign_roles(players)?;
            round.advance(players, true);
        }
        info!("round {} started", session.round.round);

        self.after_transition(&mut session);
        Ok(session.snapshot())
    }

    /// Resolves one catch attempt. A rejected attempt leaves the running
    /// turn timer untouched.
    pub async fn attempt_catch(
        &self,
        catcher_name: &str,
        target_name: &str,
    ) -> Result<(CatchOutcome, Snapshot), GameError> {
        let mut session = self.inner.lock().await;

        {
            let Session { round, players, .. } = &*session;
            round.check_catch(players, catcher_name, target_name)?;
        }

        // the catch is valid, so the running timer is now stale
        session.scheduler.cancel();
        let outcome = {
            let Session { round, players, .. } = &mut *session;
            round.attempt_catch(players, catcher_name, target_name)?
        };
        info!("{} caught {}: {:?}", catcher_name, target_name, outcome);

        session.sink.send(OutboundEvent::CatchResolved {
            catcher: catcher_name.to_string(),
            target: target_name.to_string(),
            outcome,
        });
        self.after_transition(&mut session);
        Ok((outcome, session.snapshot()))
    }

    /// Ends the round on the spot: everyone goes inactive, the timers die,
    /// the summary goes out.
    pub async fn force_end(&self) -> Result<RoundSummary, GameError> {
        let mut session = self.inner.lock().await;

        if !session.round.round_active() {
            return Err(GameError::NoActiveRound);
        }

        session.scheduler.cancel();
        {
            let Session { round, players, .. } = &mut *session;
            for p in players.iter() {
                round.mark_inactive(p.player_id);
            }
            let message = format!("Round {} force-ended", round.round);
            round.record(EventKind::Round, message);
            round.finish();
        }
        info!("round {} force-ended", session.round.round);

        let summary = session.summary();
        session.emit_summary();
        session.emit_state();
        Ok(summary)
    }

    /// Drops a player from the roster, passing the admin seat to the
    /// earliest remaining joiner and moving the turn along if the leaver
    /// held it. Unknown ids are ignored.
    pub async fn handle_disconnect(&self, player_id: PlayerId) {
        let mut session = self.inner.lock().await;

        let index = match session.players.iter().position(|p| p.player_id == player_id) {
            Some(index) => index,
            None => return,
        };
        let departing = session.players.remove(index);
        let message = format!("{} disconnected", departing.name);
        session.round.record(EventKind::Lobby, message);
        info!("{} disconnected", departing.name);

        if departing.is_admin {
            if let Some(next) = session.players.first_mut() {
                next.is_admin = true;
                info!("admin seat passed to {}", next.name);
            }
        }

        let was_active = session.round.active_player() == Some(player_id);
        if session.round.round_active() && was_active {
            session.scheduler.cancel();
            {
                let Session { round, players, .. } = &mut *session;
                round.advance(players, false);
            }
            self.after_transition(&mut session);
        } else {
            session.emit_state();
        }
    }

    /// Private role lookup for one player, for direct delivery.
    pub async fn role_of(&self, name: &str) -> Option<Role> {
        let session = self.inner.lock().await;
        let player = session.players.iter().find(|p| p.name == name)?;
        session.round.role_of(player.player_id)
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.inner.lock().await.snapshot()
    }

    /// Follows every state transition: either a fresh timer for the new
    /// turn holder, or the round summary when the round just ended.
    fn after_transition(&self, session: &mut Session<B>) {
        if session.round.round_active() {
            self.arm_turn_timer(session);
        } else {
            session.scheduler.cancel();
            session.emit_summary();
        }
        session.emit_state();
    }

    fn arm_turn_timer(&self, session: &mut Session<B>) {
        let player_id = match session.round.active_player() {
            Some(id) => id,
            None => return,
        };
        session.turn_seq += 1;
        let seq = session.turn_seq;
        let duration = session.turn_duration;
        let player_name = session.name_of(player_id).unwrap_or_default();

        let handle = self.clone();
        let deadline = tokio::spawn(async move {
            sleep(duration).await;
            handle.on_timeout(player_id, seq).await;
        });

        let sink = Arc::clone(&session.sink);
        let total_secs = duration.as_secs();
        let ticker = tokio::spawn(async move {
            let mut remaining = total_secs;
            let mut tick = interval(Duration::from_secs(1));
            tick.tick().await;
            while remaining > 0 {
                tick.tick().await;
                remaining -= 1;
                sink.send(OutboundEvent::TimerTick {
                    player: player_name.clone(),
                    remaining_secs: remaining,
                });
            }
        });

        session.scheduler.set(deadline, ticker);
    }

    /// Entry point for the deadline task only. A deadline that lost the
    /// race to a catch carries a stale sequence number and does nothing.
    async fn on_timeout(&self, player_id: PlayerId, seq: u64) {
        let mut session = self.inner.lock().await;

        if seq != session.turn_seq || session.round.active_player() != Some(player_id) {
            return;
        }

        session.scheduler.cancel();
        {
            let Session { round, players, .. } = &mut *session;
            let name = players
                .iter()
                .find(|p| p.player_id == player_id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            round.mark_inactive(player_id);
            let message = format!("{} ran out of time", name);
            round.record(EventKind::Timeout, message);
            round.advance(players, false);
            warn!("turn timer expired for {}", name);
        }
        self.after_transition(&mut session);
    }
}
