use event::{EventKind, RoundEvent};
use player::{Player, PlayerId};
use rand::{seq::SliceRandom, thread_rng};
use role::{Role, ROLE_COUNT};
use std::collections::{HashMap, HashSet};

use crate::error::GameError;

pub mod event;
pub mod player;
pub mod role;

/// Outcome of a resolved catch. These are domain outcomes, not
/// success/failure flags; validation rejections are `GameError`s.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CatchOutcome {
    /// Target held the catcher's successor role; turn rotated onward.
    Correct { zero_points: bool },
    /// The Raja's successful catch hands the turn to its victim.
    RajaCorrect,
    /// Police found the Thief; the round is over.
    PoliceCatchesThief,
    /// Roles swapped, target takes over the turn.
    Wrong,
    /// Police guessed wrong; the Thief is rewarded and the round is over.
    PoliceWrongEnd,
    /// Target could no longer act; catcher's points passed to the target.
    InactiveTarget,
    /// Police caught an inactive player and forfeited everything to the Thief.
    PoliceInactive,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnAdvance {
    NextTurn(PlayerId),
    RoundOver,
}

/// Per-round state: the role assignment, liveness, the single active
/// player and the append-only event log. Scores live on the players.
#[derive(Clone)]
pub struct Round {
    pub round: u32,
    roles: HashMap<PlayerId, Role>,
    inactive: HashSet<PlayerId>,
    active_player: Option<PlayerId>,
    events: Vec<RoundEvent>,
    round_active: bool,
}

impl Round {
    pub fn new() -> Round {
        Round {
            round: 0,
            roles: HashMap::new(),
            inactive: HashSet::new(),
            active_player: None,
            events: Vec::new(),
            round_active: false,
        }
    }

    pub fn round_active(&self) -> bool {
        self.round_active
    }

    pub fn active_player(&self) -> Option<PlayerId> {
        self.active_player
    }

    pub fn role_of(&self, player_id: PlayerId) -> Option<Role> {
        self.roles.get(&player_id).copied()
    }

    pub fn is_inactive(&self, player_id: PlayerId) -> bool {
        self.inactive.contains(&player_id)
    }

    pub fn events(&self) -> &[RoundEvent] {
        &self.events
    }

    pub fn record(&mut self, kind: EventKind, message: String) {
        self.events.push(RoundEvent { kind, message });
    }

    pub fn mark_inactive(&mut self, player_id: PlayerId) {
        self.inactive.insert(player_id);
    }

    /// True once nobody in the session can act any more this round.
    pub fn is_complete(&self, players: &[Player]) -> bool {
        players
            .iter()
            .all(|p| self.inactive.contains(&p.player_id))
    }

    /// Deals a fresh uniformly random bijection of the ten roles onto the
    /// players, in their join order. Resets liveness and the event log and
    /// bumps the round counter.
    pub fn assign_roles(&mut self, players: &[Player]) -> Result<(), GameError> {
        if players.len() != ROLE_COUNT {
            return Err(GameError::InvalidPlayerCount(players.len()));
        }

        let mut roles = Role::in_order().to_vec();
        roles.shuffle(&mut thread_rng());

        self.round += 1;
        self.roles = players
            .iter()
            .zip(roles)
            .map(|(p, r)| (p.player_id, r))
            .collect();
        self.inactive.clear();
        self.active_player = None;
        self.events.clear();
        self.round_active = true;

        let message = format!("Round {} started", self.round);
        self.record(EventKind::Round, message);
        Ok(())
    }

    /// Validates a catch without mutating anything, so a rejected attempt
    /// leaves the running turn untouched.
    pub fn check_catch(
        &self,
        players: &[Player],
        catcher_name: &str,
        target_name: &str,
    ) -> Result<(), GameError> {
        let catcher = players
            .iter()
            .find(|p| p.name == catcher_name)
            .ok_or(GameError::InvalidPlayers)?;
        let target = players
            .iter()
            .find(|p| p.name == target_name)
            .ok_or(GameError::InvalidPlayers)?;
        if catcher.player_id == target.player_id {
            return Err(GameError::InvalidPlayers);
        }
        // both must hold a role dealt this round
        if !self.roles.contains_key(&catcher.player_id)
            || !self.roles.contains_key(&target.player_id)
        {
            return Err(GameError::InvalidPlayers);
        }
        if !self.round_active {
            return Err(GameError::NoActiveRound);
        }
        if self.active_player != Some(catcher.player_id) {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    /// Resolves a catch. First matching branch wins: inactive target,
    /// then correct catch, then wrong catch. Exactly one of "rotate
    /// onward", "hand off to the target" or "end the round" happens.
    pub fn attempt_catch(
        &mut self,
        players: &mut [Player],
        catcher_name: &str,
        target_name: &str,
    ) -> Result<CatchOutcome, GameError> {
        self.check_catch(players, catcher_name, target_name)?;

        let catcher = players
            .iter()
            .position(|p| p.name == catcher_name)
            .ok_or(GameError::InvalidPlayers)?;
        let target = players
            .iter()
            .position(|p| p.name == target_name)
            .ok_or(GameError::InvalidPlayers)?;

        let catcher_role = self.roles[&players[catcher].player_id];
        let target_role = self.roles[&players[target].player_id];

        if self.inactive.contains(&players[target].player_id) {
            Ok(self.resolve_inactive_target(players, catcher, target))
        } else if target_role == catcher_role.next() {
            Ok(self.resolve_correct(players, catcher, target))
        } else {
            Ok(self.resolve_wrong(players, catcher, target))
        }
    }

    fn resolve_inactive_target(
        &mut self,
        players: &mut [Player],
        catcher: usize,
        target: usize,
    ) -> CatchOutcome {
        let catcher_id = players[catcher].player_id;
        let catcher_role = self.roles[&catcher_id];
        let target_role = self.roles[&players[target].player_id];
        let points = catcher_role.points();

        let outcome = if catcher_role == Role::Police && target_role != Role::Thief {
            // Police exposed itself on a spent seat: forfeit to the Thief
            players[catcher].score = 0;
            if let Some(thief) = self.holder_index(players, Role::Thief) {
                players[thief].score += points;
            }
            let message = format!(
                "{} caught inactive {}; everything goes to the Thief",
                players[catcher].name, players[target].name
            );
            self.record(EventKind::Catch, message);
            CatchOutcome::PoliceInactive
        } else {
            players[target].score += points;
            let message = format!(
                "{} caught inactive {}; {} points passed over",
                players[catcher].name, players[target].name, points
            );
            self.record(EventKind::Catch, message);
            CatchOutcome::InactiveTarget
        };

        self.inactive.insert(catcher_id);
        self.advance(players, false);
        outcome
    }

    fn resolve_correct(
        &mut self,
        players: &mut [Player],
        catcher: usize,
        target: usize,
    ) -> CatchOutcome {
        let catcher_id = players[catcher].player_id;
        let target_id = players[target].player_id;
        let catcher_role = self.roles[&catcher_id];
        let points = catcher_role.points();

        players[catcher].score += points;
        self.inactive.insert(catcher_id);
        let message = format!(
            "{} ({}) correctly caught {} ({}); {} points",
            players[catcher].name,
            catcher_role,
            players[target].name,
            self.roles[&target_id],
            points
        );
        self.record(EventKind::Catch, message);

        if catcher_role == Role::Police {
            // Police found the Thief: the Thief walks away with nothing
            players[target].score = 0;
            self.inactive.insert(target_id);
            self.finish();
            return CatchOutcome::PoliceCatchesThief;
        }

        if catcher_role == Role::Raja {
            debug_assert!(!self.inactive.contains(&target_id));
            self.active_player = Some(target_id);
            return CatchOutcome::RajaCorrect;
        }

        self.advance(players, false);
        CatchOutcome::Correct {
            zero_points: points == 0,
        }
    }

    fn resolve_wrong(
        &mut self,
        players: &mut [Player],
        catcher: usize,
        target: usize,
    ) -> CatchOutcome {
        let catcher_id = players[catcher].player_id;
        let target_id = players[target].player_id;
        let catcher_role = self.roles[&catcher_id];

        if catcher_role == Role::Police {
            // a wrong guess from the Police ends the round in the Thief's favour
            if let Some(thief) = self.holder_index(players, Role::Thief) {
                players[thief].score += catcher_role.points();
            }
            let message = format!(
                "{} accused {} wrongly; the Thief is rewarded",
                players[catcher].name, players[target].name
            );
            self.record(EventKind::Catch, message);
            self.finish();
            return CatchOutcome::PoliceWrongEnd;
        }

        let target_role = self.roles[&target_id];
        self.roles.insert(catcher_id, target_role);
        self.roles.insert(target_id, catcher_role);
        self.active_player = Some(target_id);
        let message = format!(
            "{} guessed wrong and swapped roles with {}",
            players[catcher].name, players[target].name
        );
        self.record(EventKind::Catch, message);
        CatchOutcome::Wrong
    }

    /// Moves the turn to the next player who can still act. Cancelling the
    /// live turn timer is the caller's job before invoking this.
    pub fn advance(&mut self, players: &[Player], start_from_raja: bool) -> TurnAdvance {
        // Police's turn is always the last one of a round
        if let Some(active) = self.active_player {
            if self.roles.get(&active) == Some(&Role::Police) {
                return self.finish();
            }
        }

        if self.is_complete(players) {
            return self.finish();
        }

        let remaining = players
            .iter()
            .filter(|p| !self.inactive.contains(&p.player_id))
            .collect::<Vec<_>>();

        let current_role = match self.active_player.and_then(|id| self.roles.get(&id).copied()) {
            Some(role) if !start_from_raja => role,
            _ => {
                // fresh round, or the vacated seat left no role to walk from
                let next = remaining
                    .iter()
                    .find(|p| self.roles.get(&p.player_id) == Some(&Role::Raja))
                    .unwrap_or(&remaining[0]);
                self.active_player = Some(next.player_id);
                return TurnAdvance::NextTurn(next.player_id);
            }
        };

        // walk the cycle just past the current role; the Thief never takes a turn
        let mut role = current_role.next();
        for _ in 0..ROLE_COUNT {
            if role != Role::Thief {
                if let Some(next) = remaining
                    .iter()
                    .find(|p| self.roles.get(&p.player_id) == Some(&role))
                {
                    self.active_player = Some(next.player_id);
                    return TurnAdvance::NextTurn(next.player_id);
                }
            }
            role = role.next();
        }

        self.active_player = Some(remaining[0].player_id);
        TurnAdvance::NextTurn(remaining[0].player_id)
    }

    pub(crate) fn finish(&mut self) -> TurnAdvance {
        self.round_active = false;
        self.active_player = None;
        TurnAdvance::RoundOver
    }

    fn holder_index(&self, players: &[Player], role: Role) -> Option<usize> {
        players
            .iter()
            .position(|p| self.roles.get(&p.player_id) == Some(&role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players() -> Vec<Player> {
        let names = [
            "raja", "rani", "pm", "cm", "dcm", "minister", "mp", "mla", "police", "thief",
        ];
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Player {
                player_id: PlayerId(i as u64 + 1),
                name: name.to_string(),
                score: 0,
                is_admin: i == 0,
            })
            .collect::<Vec<_>>()
    }

    // seat i holds the i-th role in rank order, nobody active yet
    fn fixed_round(players: &[Player]) -> Round {
        Round {
            round: 1,
            roles: players
                .iter()
                .zip(Role::in_order())
                .map(|(p, r)| (p.player_id, r))
                .collect(),
            inactive: HashSet::new(),
            active_player: None,
            events: Vec::new(),
            round_active: true,
        }
    }

    fn id_of(players: &[Player], name: &str) -> PlayerId {
        players.iter().find(|p| p.name == name).unwrap().player_id
    }

    fn score_of(players: &[Player], name: &str) -> u64 {
        players.iter().find(|p| p.name == name).unwrap().score
    }

    #[test]
    fn assign_roles_needs_exactly_ten_players() {
        let mut nine = players();
        nine.pop();
        let mut round = Round::new();
        assert_eq!(
            round.assign_roles(&nine),
            Err(GameError::InvalidPlayerCount(9))
        );
        assert!(!round.round_active());
    }

    #[test]
    fn assign_roles_is_a_bijection() {
        let players = players();
        let mut round = Round::new();
        round.assign_roles(&players).unwrap();
        let dealt = players
            .iter()
            .map(|p| round.role_of(p.player_id).unwrap())
            .collect::<HashSet<_>>();
        assert_eq!(dealt.len(), ROLE_COUNT);
        assert_eq!(round.round, 1);
        assert!(round.round_active());
    }

    #[test]
    fn assign_roles_is_uniform_over_many_deals() {
        let players = players();
        let first = players[0].player_id;
        let order = Role::in_order();
        let mut counts = [0u32; ROLE_COUNT];

        let mut round = Round::new();
        for _ in 0..10_000 {
            round.assign_roles(&players).unwrap();
            let role = round.role_of(first).unwrap();
            let seat = order.iter().position(|r| *r == role).unwrap();
            counts[seat] += 1;
        }

        // chi-square against uniform, df = 9; 40.0 is far out in the tail
        let expected = 1_000.0f64;
        let chi2 = counts
            .iter()
            .map(|&c| {
                let d = c as f64 - expected;
                d * d / expected
            })
            .sum::<f64>();
        assert!(chi2 < 40.0, "chi2 = {chi2}, counts = {counts:?}");
    }

    #[test]
    fn correct_catch_scores_and_rotates() {
        let mut players = players();
        let mut round = fixed_round(&players);
        round.active_player = Some(id_of(&players, "rani"));

        let outcome = round.attempt_catch(&mut players, "rani", "pm").unwrap();

        assert_eq!(outcome, CatchOutcome::Correct { zero_points: false });
        assert_eq!(score_of(&players, "rani"), Role::Rani.points());
        assert!(round.is_inactive(id_of(&players, "rani")));
        assert_eq!(round.active_player(), Some(id_of(&players, "pm")));
        assert!(round.round_active());
    }

    #[test]
    fn raja_hands_the_turn_to_its_victim() {
        let mut players = players();
        let mut round = fixed_round(&players);
        round.active_player = Some(id_of(&players, "raja"));

        let outcome = round.attempt_catch(&mut players, "raja", "rani").unwrap();

        assert_eq!(outcome, CatchOutcome::RajaCorrect);
        assert_eq!(score_of(&players, "raja"), Role::Raja.points());
        assert!(round.is_inactive(id_of(&players, "raja")));
        assert_eq!(round.active_player(), Some(id_of(&players, "rani")));
        assert!(!round.is_inactive(id_of(&players, "rani")));
    }

    #[test]
    fn police_catching_thief_ends_the_round() {
        let mut players = players();
        players[9].score = 500;
        let mut round = fixed_round(&players);
        round.active_player = Some(id_of(&players, "police"));

        let outcome = round
            .attempt_catch(&mut players, "police", "thief")
            .unwrap();

        assert_eq!(outcome, CatchOutcome::PoliceCatchesThief);
        assert_eq!(score_of(&players, "police"), Role::Police.points());
        assert_eq!(score_of(&players, "thief"), 0);
        assert!(round.is_inactive(id_of(&players, "thief")));
        assert!(!round.round_active());
        assert_eq!(round.active_player(), None);
    }

    #[test]
    fn wrong_catch_swaps_roles_and_hands_over() {
        let mut players = players();
        let mut round = fixed_round(&players);
        round.active_player = Some(id_of(&players, "rani"));

        let outcome = round.attempt_catch(&mut players, "rani", "mla").unwrap();

        assert_eq!(outcome, CatchOutcome::Wrong);
        assert_eq!(round.role_of(id_of(&players, "rani")), Some(Role::Mla));
        assert_eq!(round.role_of(id_of(&players, "mla")), Some(Role::Rani));
        assert_eq!(round.active_player(), Some(id_of(&players, "mla")));
        assert!(!round.is_inactive(id_of(&players, "rani")));
        assert_eq!(score_of(&players, "rani"), 0);
        assert!(round.round_active());
    }

    #[test]
    fn police_wrong_catch_rewards_the_thief_and_ends() {
        let mut players = players();
        let mut round = fixed_round(&players);
        round.active_player = Some(id_of(&players, "police"));

        let outcome = round.attempt_catch(&mut players, "police", "rani").unwrap();

        assert_eq!(outcome, CatchOutcome::PoliceWrongEnd);
        assert_eq!(score_of(&players, "thief"), Role::Police.points());
        // no swap on the terminal wrong catch
        assert_eq!(round.role_of(id_of(&players, "police")), Some(Role::Police));
        assert_eq!(round.role_of(id_of(&players, "rani")), Some(Role::Rani));
        assert!(!round.round_active());
    }

    #[test]
    fn catching_an_inactive_target_passes_the_points_over() {
        let mut players = players();
        let mut round = fixed_round(&players);
        round.mark_inactive(id_of(&players, "pm"));
        round.active_player = Some(id_of(&players, "rani"));

        let outcome = round.attempt_catch(&mut players, "rani", "pm").unwrap();

        assert_eq!(outcome, CatchOutcome::InactiveTarget);
        assert_eq!(score_of(&players, "pm"), Role::Rani.points());
        assert_eq!(score_of(&players, "rani"), 0);
        assert!(round.is_inactive(id_of(&players, "rani")));
        // pm is spent, so the turn moves on to cm
        assert_eq!(round.active_player(), Some(id_of(&players, "cm")));
    }

    #[test]
    fn police_catching_an_inactive_target_forfeits_to_the_thief() {
        let mut players = players();
        players[8].score = 1_234;
        let mut round = fixed_round(&players);
        round.mark_inactive(id_of(&players, "rani"));
        round.active_player = Some(id_of(&players, "police"));

        let outcome = round.attempt_catch(&mut players, "police", "rani").unwrap();

        assert_eq!(outcome, CatchOutcome::PoliceInactive);
        assert_eq!(score_of(&players, "police"), 0);
        assert_eq!(score_of(&players, "thief"), Role::Police.points());
        assert_eq!(score_of(&players, "rani"), 0);
        // Police was the active seat, so the round is over
        assert!(!round.round_active());
    }

    #[test]
    fn catch_validation_rejects_without_mutating() {
        let mut players = players();
        let mut round = fixed_round(&players);
        round.active_player = Some(id_of(&players, "rani"));

        assert_eq!(
            round.attempt_catch(&mut players, "pm", "cm"),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(
            round.attempt_catch(&mut players, "rani", "nobody"),
            Err(GameError::InvalidPlayers)
        );
        assert_eq!(
            round.attempt_catch(&mut players, "rani", "rani"),
            Err(GameError::InvalidPlayers)
        );

        round.round_active = false;
        assert_eq!(
            round.attempt_catch(&mut players, "rani", "pm"),
            Err(GameError::NoActiveRound)
        );

        assert!(players.iter().all(|p| p.score == 0));
    }

    #[test]
    fn advance_skips_thief_and_spent_seats() {
        let players = players();
        let mut round = fixed_round(&players);
        round.active_player = Some(id_of(&players, "mla"));
        round.mark_inactive(id_of(&players, "police"));

        let next = round.advance(&players, false);

        // Police is spent and the Thief never takes a turn, so it wraps to Raja
        assert_eq!(next, TurnAdvance::NextTurn(id_of(&players, "raja")));
    }

    #[test]
    fn advance_ends_the_round_after_police() {
        let players = players();
        let mut round = fixed_round(&players);
        round.active_player = Some(id_of(&players, "police"));

        assert_eq!(round.advance(&players, false), TurnAdvance::RoundOver);
        assert!(!round.round_active());
    }

    #[test]
    fn advance_falls_back_to_any_remaining_player() {
        let players = players();
        let mut round = fixed_round(&players);
        for p in players.iter() {
            if p.name != "thief" && p.name != "rani" {
                round.mark_inactive(p.player_id);
            }
        }
        round.active_player = Some(id_of(&players, "rani"));
        round.mark_inactive(id_of(&players, "rani"));

        // only the Thief holder is left; the fallback hands them the turn
        let next = round.advance(&players, false);
        assert_eq!(next, TurnAdvance::NextTurn(id_of(&players, "thief")));
    }

    #[test]
    fn advance_with_nobody_left_ends_the_round() {
        let players = players();
        let mut round = fixed_round(&players);
        for p in players.iter() {
            round.mark_inactive(p.player_id);
        }
        round.active_player = None;

        assert_eq!(round.advance(&players, false), TurnAdvance::RoundOver);
        assert!(!round.round_active());
    }

    #[test]
    fn event_log_is_append_only() {
        let mut round = Round::new();
        round.record(EventKind::Lobby, "a joined".to_string());
        round.record(EventKind::Lobby, "b joined".to_string());
        assert_eq!(round.events().len(), 2);
        assert_eq!(round.events()[0].message, "a joined");
        assert_eq!(round.events()[1].kind, EventKind::Lobby);
    }
}
