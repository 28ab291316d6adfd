//! Gate session state machine
//!
//! `Auth → Battle → Victory`, strictly forward. Every delayed transition is an
//! entry in the session's own [`TimerQueue`], polled by [`GateSession::advance`],
//! so tearing the session down cancels all of them at once.
//!
//! Operations return the [`GateEvent`]s they caused. An empty list means the
//! input was ignored (wrong phase, or a transition already in flight).

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::puzzle::{self, AuthMode, Challenge};
use super::timer::{TimerId, TimerQueue};
use super::victory::VictoryScene;
use crate::consts::*;

/// Gate phase, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    /// Solving a challenge (or waiting on guest access)
    Auth,
    /// Hero vs. enemy
    Battle,
    /// Access granted, waiting to report completion
    Victory,
}

/// The hero's projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ProjectileState {
    #[default]
    Idle,
    Flying,
    Impact,
}

/// The opposing entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum EnemyState {
    #[default]
    Alive,
    Shattering,
    Dead,
}

/// Battle substates, both advanced strictly forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BattleState {
    pub projectile: ProjectileState,
    pub enemy: EnemyState,
}

/// Observable result of a gate operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// A fresh challenge is showing
    ChallengeIssued(AuthMode),
    /// Wrong answer; the error flag is now set
    Rejected,
    /// The error flag cleared itself
    ErrorCleared,
    /// Guest access is loading
    BypassStarted,
    PhaseChanged(Phase),
    ProjectileLaunched,
    /// Projectile hit; the enemy started shattering
    ProjectileImpact,
    EnemyDefeated,
    /// The completion callback has run
    Completed,
}

/// Invoked once when the gate may be dismissed
pub type CompletionCallback = Box<dyn FnOnce()>;

/// Delayed transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateTimer {
    ClearError,
    BypassDone,
    ProjectileHit,
    EnemyDown,
    Complete,
}

/// One activation of the gate
pub struct GateSession {
    phase: Phase,
    auth_mode: AuthMode,
    challenge: Challenge,
    input: String,
    error_flag: bool,
    bypass_pending: bool,
    rejections: u32,
    battle: BattleState,
    victory: Option<VictoryScene>,

    timers: TimerQueue<GateTimer>,
    /// The single in-flight phase chain timer
    chain_timer: Option<TimerId>,
    error_timer: Option<TimerId>,
    rng: Pcg32,
    started_ms: f64,
    now_ms: f64,
    on_complete: Option<CompletionCallback>,
    completed: bool,
}

impl std::fmt::Debug for GateSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateSession")
            .field("phase", &self.phase)
            .field("auth_mode", &self.auth_mode)
            .field("error_flag", &self.error_flag)
            .field("bypass_pending", &self.bypass_pending)
            .field("battle", &self.battle)
            .field("pending_timers", &self.timers.len())
            .field("completed", &self.completed)
            .finish()
    }
}

impl GateSession {
    /// Start a session at `now_ms` with a fresh math challenge
    pub fn activate(now_ms: f64, seed: u64, on_complete: impl FnOnce() + 'static) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let auth_mode = AuthMode::default();
        let challenge = puzzle::generate(auth_mode, &mut rng);
        log::info!("Gate activated ({:?})", auth_mode);
        Self {
            phase: Phase::Auth,
            auth_mode,
            challenge,
            input: String::new(),
            error_flag: false,
            bypass_pending: false,
            rejections: 0,
            battle: BattleState::default(),
            victory: None,
            timers: TimerQueue::new(),
            chain_timer: None,
            error_timer: None,
            rng,
            started_ms: now_ms,
            now_ms,
            on_complete: Some(Box::new(on_complete)),
            completed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn error_flag(&self) -> bool {
        self.error_flag
    }

    pub fn bypass_pending(&self) -> bool {
        self.bypass_pending
    }

    pub fn rejections(&self) -> u32 {
        self.rejections
    }

    pub fn battle(&self) -> BattleState {
        self.battle
    }

    pub fn victory(&self) -> Option<&VictoryScene> {
        self.victory.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Session clock: time since activation as of the last `advance`
    pub fn elapsed_ms(&self) -> f64 {
        self.now_ms - self.started_ms
    }

    /// Number of delayed transitions still pending
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Auth inputs are only live while no transition is in flight
    fn accepting_auth_input(&self) -> bool {
        self.phase == Phase::Auth && !self.bypass_pending
    }

    /// Replace the attempt text
    pub fn set_input(&mut self, text: &str) {
        if self.accepting_auth_input() {
            self.input.clear();
            self.input.push_str(text);
        }
    }

    /// Switch puzzle variant; issues a new challenge and clears the input
    pub fn set_auth_mode(&mut self, mode: AuthMode) -> Vec<GateEvent> {
        if !self.accepting_auth_input() || mode == self.auth_mode {
            return Vec::new();
        }
        self.auth_mode = mode;
        self.challenge = puzzle::generate(mode, &mut self.rng);
        self.input.clear();
        log::debug!("Auth mode switched to {:?}", mode);
        vec![GateEvent::ChallengeIssued(mode)]
    }

    /// Check the current input against the challenge
    pub fn submit(&mut self) -> Vec<GateEvent> {
        if !self.accepting_auth_input() {
            return Vec::new();
        }
        if self.challenge.verify(&self.input) {
            log::info!("Challenge solved after {} rejection(s)", self.rejections);
            return self.enter_battle();
        }

        self.rejections += 1;
        self.input.clear();
        self.error_flag = true;
        if let Some(id) = self.error_timer.take() {
            self.timers.cancel(id);
        }
        self.error_timer = Some(
            self.timers
                .schedule(self.now_ms, ERROR_FLASH_MS, GateTimer::ClearError),
        );
        log::debug!("Challenge rejected ({} so far)", self.rejections);
        vec![GateEvent::Rejected]
    }

    /// Guest access: battle after a short simulated load, no puzzle needed
    pub fn bypass(&mut self) -> Vec<GateEvent> {
        if !self.accepting_auth_input() {
            return Vec::new();
        }
        self.bypass_pending = true;
        self.schedule_chain(BYPASS_DELAY_MS, GateTimer::BypassDone);
        log::info!("Guest access requested");
        vec![GateEvent::BypassStarted]
    }

    /// Launch the projectile. Ignored unless battling with an idle projectile.
    pub fn fire(&mut self) -> Vec<GateEvent> {
        if self.phase != Phase::Battle || self.battle.projectile != ProjectileState::Idle {
            return Vec::new();
        }
        self.battle.projectile = ProjectileState::Flying;
        self.schedule_chain(PROJECTILE_FLIGHT_MS, GateTimer::ProjectileHit);
        log::debug!("Projectile launched");
        vec![GateEvent::ProjectileLaunched]
    }

    /// Move the session clock to `now_ms` and run every transition now due
    pub fn advance(&mut self, now_ms: f64) -> Vec<GateEvent> {
        self.now_ms = self.now_ms.max(now_ms);
        let mut events = Vec::new();
        while let Some((id, due_ms, timer)) = self.timers.pop_due(self.now_ms) {
            if self.chain_timer == Some(id) {
                self.chain_timer = None;
            }
            if self.error_timer == Some(id) {
                self.error_timer = None;
            }
            self.fire_timer(timer, due_ms, &mut events);
        }
        events
    }

    /// Step the victory animation by one display frame
    pub fn animate(&mut self) {
        if let Some(scene) = &mut self.victory {
            scene.advance();
        }
    }

    /// Cancel every pending transition and drop the callback unrun
    pub fn teardown(&mut self) {
        let pending = self.timers.len();
        self.timers.clear();
        self.chain_timer = None;
        self.error_timer = None;
        self.on_complete = None;
        log::debug!("Gate torn down in {:?} ({} timer(s) canceled)", self.phase, pending);
    }

    fn schedule_chain(&mut self, delay_ms: f64, timer: GateTimer) {
        if let Some(id) = self.chain_timer.take() {
            self.timers.cancel(id);
        }
        self.chain_timer = Some(self.timers.schedule(self.now_ms, delay_ms, timer));
    }

    fn enter_battle(&mut self) -> Vec<GateEvent> {
        self.phase = Phase::Battle;
        self.bypass_pending = false;
        self.input.clear();
        if let Some(id) = self.error_timer.take() {
            self.timers.cancel(id);
        }
        self.error_flag = false;
        log::info!("Gate phase: Battle");
        vec![GateEvent::PhaseChanged(Phase::Battle)]
    }

    /// Run one delayed transition. Follow-ups are scheduled from the moment
    /// this one was due, not from when it was polled.
    fn fire_timer(&mut self, timer: GateTimer, due_ms: f64, events: &mut Vec<GateEvent>) {
        match timer {
            GateTimer::ClearError => {
                self.error_flag = false;
                events.push(GateEvent::ErrorCleared);
            }
            GateTimer::BypassDone => {
                events.extend(self.enter_battle());
            }
            GateTimer::ProjectileHit => {
                self.battle.projectile = ProjectileState::Impact;
                self.battle.enemy = EnemyState::Shattering;
                self.chain_timer = Some(self.timers.schedule(
                    due_ms,
                    ENEMY_SHATTER_MS,
                    GateTimer::EnemyDown,
                ));
                log::debug!("Projectile impact");
                events.push(GateEvent::ProjectileImpact);
            }
            GateTimer::EnemyDown => {
                self.battle.enemy = EnemyState::Dead;
                self.phase = Phase::Victory;
                self.victory = Some(VictoryScene::new(self.rng.random()));
                self.chain_timer = Some(self.timers.schedule(
                    due_ms,
                    VICTORY_HOLD_MS,
                    GateTimer::Complete,
                ));
                log::info!("Gate phase: Victory");
                events.push(GateEvent::EnemyDefeated);
                events.push(GateEvent::PhaseChanged(Phase::Victory));
            }
            GateTimer::Complete => {
                if let Some(on_complete) = self.on_complete.take() {
                    self.completed = true;
                    log::info!("Gate complete after {:.0} ms", due_ms - self.started_ms);
                    on_complete();
                    events.push(GateEvent::Completed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::puzzle::MathOp;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_session(now: f64) -> (GateSession, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let session = GateSession::activate(now, 12345, move || c.set(c.get() + 1));
        (session, calls)
    }

    fn solve(session: &mut GateSession) -> Vec<GateEvent> {
        let answer = session.challenge().answer();
        session.set_input(&answer);
        session.submit()
    }

    /// Drive a session from activation to the start of Victory
    fn to_victory(session: &mut GateSession) -> f64 {
        solve(session);
        session.fire();
        session.advance(PROJECTILE_FLIGHT_MS);
        session.advance(PROJECTILE_FLIGHT_MS + ENEMY_SHATTER_MS);
        assert_eq!(session.phase(), Phase::Victory);
        PROJECTILE_FLIGHT_MS + ENEMY_SHATTER_MS
    }

    #[test]
    fn test_starts_in_auth_with_math() {
        let (session, calls) = counting_session(0.0);
        assert_eq!(session.phase(), Phase::Auth);
        assert_eq!(session.auth_mode(), AuthMode::MathChallenge);
        assert!(matches!(session.challenge(), Challenge::Math { .. }));
        assert_eq!(session.pending_timers(), 0);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_example_scenario() {
        let (mut session, _) = counting_session(0.0);
        session.challenge = Challenge::Math {
            a: 0xD,
            b: 0x3,
            op: MathOp::Add,
        };

        session.set_input("15");
        assert_eq!(session.submit(), vec![GateEvent::Rejected]);
        assert_eq!(session.phase(), Phase::Auth);
        assert!(session.error_flag());
        assert_eq!(session.input(), "");

        assert!(session.advance(499.0).is_empty());
        assert!(session.error_flag());
        assert_eq!(session.advance(500.0), vec![GateEvent::ErrorCleared]);
        assert!(!session.error_flag());

        session.set_input("16");
        assert_eq!(session.submit(), vec![GateEvent::PhaseChanged(Phase::Battle)]);
        assert_eq!(session.phase(), Phase::Battle);
    }

    #[test]
    fn test_each_rejection_raises_flag_once() {
        let (mut session, _) = counting_session(0.0);
        let mut rejected = 0;
        for (t, guess) in [(0.0, "nope"), (100.0, ""), (200.0, "   ")] {
            session.advance(t);
            session.set_input(guess);
            let events = session.submit();
            rejected += events.iter().filter(|e| **e == GateEvent::Rejected).count();
        }
        assert_eq!(rejected, 3);
        assert_eq!(session.rejections(), 3);
        // Repeated rejections extend the flash rather than stacking timers
        assert_eq!(session.pending_timers(), 1);
        assert!(session.advance(699.0).is_empty());
        assert_eq!(session.advance(700.0), vec![GateEvent::ErrorCleared]);
        assert_eq!(session.phase(), Phase::Auth);
    }

    #[test]
    fn test_knowledge_mode_is_case_insensitive() {
        let (mut session, _) = counting_session(0.0);
        let events = session.set_auth_mode(AuthMode::KnowledgeChallenge);
        assert_eq!(events, vec![GateEvent::ChallengeIssued(AuthMode::KnowledgeChallenge)]);
        let keyword = session.challenge().answer();
        session.set_input(&format!("  {}  ", keyword.to_lowercase()));
        session.submit();
        assert_eq!(session.phase(), Phase::Battle);
    }

    #[test]
    fn test_mode_switch_regenerates_and_clears() {
        let (mut session, _) = counting_session(0.0);
        session.set_input("42");
        assert!(session.set_auth_mode(AuthMode::MathChallenge).is_empty());
        assert_eq!(session.input(), "42");

        session.set_auth_mode(AuthMode::KnowledgeChallenge);
        assert_eq!(session.input(), "");
        assert!(matches!(session.challenge(), Challenge::Knowledge { .. }));
        session.set_auth_mode(AuthMode::MathChallenge);
        assert!(matches!(session.challenge(), Challenge::Math { .. }));
    }

    #[test]
    fn test_bypass_enters_battle_after_delay() {
        let (mut session, _) = counting_session(1000.0);
        assert_eq!(session.bypass(), vec![GateEvent::BypassStarted]);
        assert!(session.bypass_pending());

        // Everything else is ignored while loading
        assert!(session.bypass().is_empty());
        session.set_input(&session.challenge().answer());
        assert!(session.submit().is_empty());
        assert!(session.set_auth_mode(AuthMode::KnowledgeChallenge).is_empty());

        assert!(session.advance(1000.0 + BYPASS_DELAY_MS - 1.0).is_empty());
        assert_eq!(
            session.advance(1000.0 + BYPASS_DELAY_MS),
            vec![GateEvent::PhaseChanged(Phase::Battle)]
        );
        assert!(!session.bypass_pending());
    }

    #[test]
    fn test_battle_choreography() {
        let (mut session, calls) = counting_session(0.0);
        assert!(session.fire().is_empty(), "fire is ignored during auth");
        solve(&mut session);

        assert_eq!(session.fire(), vec![GateEvent::ProjectileLaunched]);
        assert_eq!(session.battle().projectile, ProjectileState::Flying);
        assert_eq!(session.battle().enemy, EnemyState::Alive);

        assert!(session.advance(PROJECTILE_FLIGHT_MS - 1.0).is_empty());
        assert_eq!(session.advance(PROJECTILE_FLIGHT_MS), vec![GateEvent::ProjectileImpact]);
        assert_eq!(
            session.battle(),
            BattleState {
                projectile: ProjectileState::Impact,
                enemy: EnemyState::Shattering,
            }
        );
        assert_eq!(session.phase(), Phase::Battle);

        let done = PROJECTILE_FLIGHT_MS + ENEMY_SHATTER_MS;
        assert!(session.advance(done - 1.0).is_empty());
        assert_eq!(
            session.advance(done),
            vec![GateEvent::EnemyDefeated, GateEvent::PhaseChanged(Phase::Victory)]
        );
        assert_eq!(session.battle().enemy, EnemyState::Dead);
        assert!(session.victory().is_some());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_single_late_poll_keeps_order() {
        let (mut session, calls) = counting_session(0.0);
        solve(&mut session);
        session.fire();
        // One very late frame still replays every step, in order
        let events = session.advance(10_000.0);
        assert_eq!(
            events,
            vec![
                GateEvent::ProjectileImpact,
                GateEvent::EnemyDefeated,
                GateEvent::PhaseChanged(Phase::Victory),
                GateEvent::Completed,
            ]
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_refire_is_noop() {
        let (mut session, _) = counting_session(0.0);
        solve(&mut session);
        session.fire();
        assert!(session.fire().is_empty());
        session.advance(PROJECTILE_FLIGHT_MS);
        assert!(session.fire().is_empty());
        assert_eq!(session.pending_timers(), 1);
        session.advance(PROJECTILE_FLIGHT_MS + ENEMY_SHATTER_MS);
        assert!(session.fire().is_empty());
    }

    #[test]
    fn test_completion_fires_once_after_hold() {
        let (mut session, calls) = counting_session(0.0);
        let victory_at = to_victory(&mut session);

        session.animate();
        assert!(session.advance(victory_at + VICTORY_HOLD_MS - 1.0).is_empty());
        assert_eq!(calls.get(), 0);
        assert!(!session.is_complete());

        assert_eq!(
            session.advance(victory_at + VICTORY_HOLD_MS),
            vec![GateEvent::Completed]
        );
        assert_eq!(calls.get(), 1);
        assert!(session.is_complete());

        assert!(session.advance(victory_at + 60_000.0).is_empty());
        assert_eq!(calls.get(), 1);
        assert_eq!(session.phase(), Phase::Victory);
    }

    #[test]
    fn test_teardown_cancels_everything() {
        let (mut session, calls) = counting_session(0.0);
        solve(&mut session);
        session.fire();
        session.teardown();
        assert_eq!(session.pending_timers(), 0);
        assert!(session.advance(1e9).is_empty());
        assert_eq!(session.battle().projectile, ProjectileState::Flying);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_teardown_in_victory() {
        let (mut session, calls) = counting_session(0.0);
        let victory_at = to_victory(&mut session);
        session.teardown();
        session.advance(victory_at + VICTORY_HOLD_MS * 2.0);
        assert_eq!(calls.get(), 0);
        assert!(!session.is_complete());
    }

    #[test]
    fn test_drop_before_timers_never_calls_back() {
        let (mut session, calls) = counting_session(0.0);
        session.bypass();
        drop(session);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_phases_only_move_forward() {
        let (mut session, _) = counting_session(0.0);
        let mut seen = vec![session.phase()];
        solve(&mut session);
        seen.push(session.phase());
        session.fire();
        for t in (0..8000).step_by(16) {
            session.advance(t as f64);
            session.animate();
            if seen.last() != Some(&session.phase()) {
                seen.push(session.phase());
            }
        }
        assert_eq!(seen, vec![Phase::Auth, Phase::Battle, Phase::Victory]);
        // Auth inputs are dead after leaving Auth
        assert!(session.bypass().is_empty());
        assert!(session.submit().is_empty());
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let (mut session, _) = counting_session(500.0);
        session.advance(800.0);
        session.advance(600.0);
        assert_eq!(session.elapsed_ms(), 300.0);
    }
}
