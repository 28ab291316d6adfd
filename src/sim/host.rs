//! Gate host: locks site content behind a gate session and replays the one
//! navigation requested while locked.

use std::cell::Cell;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::gate::{GateEvent, GateSession};

/// How the content behind the gate is presented
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentTreatment {
    /// Blur radius in px
    pub blur_px: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl ContentTreatment {
    pub const LOCKED: Self = Self {
        blur_px: 16.0,
        scale: 0.95,
        opacity: 0.0,
    };

    pub const UNLOCKED: Self = Self {
        blur_px: 0.0,
        scale: 1.0,
        opacity: 1.0,
    };

    /// CSS `filter` value
    pub fn filter_css(&self) -> String {
        if self.blur_px > 0.0 {
            format!("blur({}px)", self.blur_px)
        } else {
            "none".to_string()
        }
    }

    /// CSS `transform` value
    pub fn transform_css(&self) -> String {
        format!("scale({})", self.scale)
    }
}

/// Owns the active gate session and the destination it guards
///
/// `D` is opaque: the host only compares and hands it back.
pub struct GateHost<D> {
    current: D,
    pending: Option<D>,
    session: Option<GateSession>,
    /// Set by the session's completion callback
    unlocked: Rc<Cell<bool>>,
    rng: Pcg32,
}

impl<D: std::fmt::Debug> std::fmt::Debug for GateHost<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateHost")
            .field("current", &self.current)
            .field("pending", &self.pending)
            .field("session", &self.session)
            .finish()
    }
}

impl<D: Clone + PartialEq + std::fmt::Debug> GateHost<D> {
    /// Start locked on `initial` with a fresh session
    pub fn new(initial: D, now_ms: f64, seed: u64) -> Self {
        let mut host = Self {
            current: initial,
            pending: None,
            session: None,
            unlocked: Rc::new(Cell::new(false)),
            rng: Pcg32::seed_from_u64(seed),
        };
        host.lock(now_ms);
        host
    }

    pub fn is_locked(&self) -> bool {
        self.session.is_some()
    }

    pub fn current(&self) -> &D {
        &self.current
    }

    pub fn pending(&self) -> Option<&D> {
        self.pending.as_ref()
    }

    pub fn gate(&self) -> Option<&GateSession> {
        self.session.as_ref()
    }

    pub fn gate_mut(&mut self) -> Option<&mut GateSession> {
        self.session.as_mut()
    }

    pub fn treatment(&self) -> ContentTreatment {
        if self.is_locked() {
            ContentTreatment::LOCKED
        } else {
            ContentTreatment::UNLOCKED
        }
    }

    /// Ask to go to `dest`
    ///
    /// Same-destination requests are ignored. Otherwise `dest` replaces any
    /// earlier pending request and the content is locked behind a new gate
    /// if it was open.
    pub fn request_navigation(&mut self, dest: D, now_ms: f64) {
        if dest == self.current {
            log::debug!("Navigation to {:?} ignored (already there)", dest);
            return;
        }
        log::info!("Navigation to {:?} pending", dest);
        self.pending = Some(dest);
        if !self.is_locked() {
            self.lock(now_ms);
        }
    }

    /// Drive the active session. Returns the destination navigated to when
    /// the gate completes with a request pending.
    pub fn advance(&mut self, now_ms: f64) -> Option<D> {
        let events = self.session.as_mut()?.advance(now_ms);
        if !events.contains(&GateEvent::Completed) && !self.unlocked.get() {
            return None;
        }
        self.unlock();
        let dest = self.pending.take()?;
        log::info!("Navigating to {:?}", dest);
        self.current = dest.clone();
        Some(dest)
    }

    /// Drop the session and any pending request without unlocking
    pub fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.teardown();
        }
        self.pending = None;
    }

    fn lock(&mut self, now_ms: f64) {
        let unlocked = Rc::new(Cell::new(false));
        let flag = unlocked.clone();
        self.unlocked = unlocked;
        self.session = Some(GateSession::activate(now_ms, self.rng.random(), move || {
            flag.set(true)
        }));
        log::info!("Content locked");
    }

    fn unlock(&mut self) {
        self.session = None;
        self.unlocked.set(false);
        log::info!("Content unlocked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::gate::Phase;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Dest {
        Home,
        About,
        Projects,
    }

    /// Solve, fire and return the time the gate completes
    fn win(host: &mut GateHost<Dest>, now: f64) -> f64 {
        host.advance(now);
        let gate = host.gate_mut().unwrap();
        let answer = gate.challenge().answer();
        gate.set_input(&answer);
        gate.submit();
        gate.fire();
        now + PROJECTILE_FLIGHT_MS + ENEMY_SHATTER_MS + VICTORY_HOLD_MS
    }

    #[test]
    fn test_starts_locked() {
        let host = GateHost::new(Dest::Home, 0.0, 1);
        assert!(host.is_locked());
        assert_eq!(host.treatment(), ContentTreatment::LOCKED);
        assert_eq!(host.gate().unwrap().phase(), Phase::Auth);
        assert_eq!(host.pending(), None);
    }

    #[test]
    fn test_unlock_without_pending_stays_put() {
        let mut host = GateHost::new(Dest::Home, 0.0, 1);
        let done = win(&mut host, 0.0);
        assert_eq!(host.advance(done - 1.0), None);
        assert!(host.is_locked());
        assert_eq!(host.advance(done), None);
        assert!(!host.is_locked());
        assert_eq!(host.treatment(), ContentTreatment::UNLOCKED);
        assert_eq!(host.current(), &Dest::Home);
    }

    #[test]
    fn test_latest_request_wins() {
        let mut host = GateHost::new(Dest::Home, 0.0, 1);
        host.request_navigation(Dest::About, 10.0);
        host.request_navigation(Dest::Projects, 20.0);
        assert_eq!(host.pending(), Some(&Dest::Projects));

        let done = win(&mut host, 30.0);
        assert_eq!(host.advance(done), Some(Dest::Projects));
        assert_eq!(host.current(), &Dest::Projects);
        assert_eq!(host.pending(), None);
        // Exactly one navigation
        assert_eq!(host.advance(done + 1000.0), None);
    }

    #[test]
    fn test_same_destination_ignored() {
        let mut host = GateHost::new(Dest::Home, 0.0, 1);
        let done = win(&mut host, 0.0);
        host.advance(done);
        host.request_navigation(Dest::Home, done + 10.0);
        assert!(!host.is_locked());
        assert_eq!(host.pending(), None);
    }

    #[test]
    fn test_same_destination_keeps_other_pending() {
        let mut host = GateHost::new(Dest::Home, 0.0, 1);
        host.request_navigation(Dest::About, 10.0);
        host.request_navigation(Dest::Home, 20.0);
        assert!(host.is_locked());
        assert_eq!(host.pending(), Some(&Dest::About));

        let done = win(&mut host, 30.0);
        assert_eq!(host.advance(done), Some(Dest::About));
        assert_eq!(host.advance(done + 1000.0), None);
        assert_eq!(host.current(), &Dest::About);
    }

    #[test]
    fn test_request_while_unlocked_relocks() {
        let mut host = GateHost::new(Dest::Home, 0.0, 1);
        let done = win(&mut host, 0.0);
        host.advance(done);

        host.request_navigation(Dest::About, done + 100.0);
        assert!(host.is_locked());
        assert_eq!(host.gate().unwrap().phase(), Phase::Auth);

        let done = win(&mut host, done + 200.0);
        assert_eq!(host.advance(done), Some(Dest::About));
    }

    #[test]
    fn test_teardown_drops_everything() {
        let mut host = GateHost::new(Dest::Home, 0.0, 1);
        host.request_navigation(Dest::About, 0.0);
        let done = win(&mut host, 0.0);
        host.teardown();
        assert_eq!(host.advance(done * 2.0), None);
        assert_eq!(host.current(), &Dest::Home);
    }

    #[test]
    fn test_treatment_css() {
        assert_eq!(ContentTreatment::LOCKED.filter_css(), "blur(16px)");
        assert_eq!(ContentTreatment::LOCKED.transform_css(), "scale(0.95)");
        assert_eq!(ContentTreatment::UNLOCKED.filter_css(), "none");
    }
}
