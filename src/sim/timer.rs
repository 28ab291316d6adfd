//! Cancelable delayed tasks and the fixed-step frame clock
//!
//! Nothing here owns a real browser timer. Deadlines are plain timestamps that
//! the owner polls from its frame loop, so dropping the owner is the same as
//! canceling every pending task.

use crate::consts::{MAX_FRAME_GAP_MS, MAX_SUBSTEPS, STEP_MS};

/// Handle returned by [`TimerQueue::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending<E> {
    id: TimerId,
    due_ms: f64,
    event: E,
}

/// Queue of delayed events keyed by deadline
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    /// Sorted by (due_ms, id)
    pending: Vec<Pending<E>>,
    next_id: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 1,
        }
    }

    /// Schedule `event` to fire once `now_ms + delay_ms` is reached
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due_ms = now_ms + delay_ms.max(0.0);
        // Equal deadlines fire in scheduling order
        let idx = self.pending.partition_point(|p| p.due_ms <= due_ms);
        self.pending.insert(idx, Pending { id, due_ms, event });
        id
    }

    /// Cancel a pending event. Returns false if it already fired or was canceled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Deadline of the next event, if any
    pub fn next_due(&self) -> Option<f64> {
        self.pending.first().map(|p| p.due_ms)
    }

    /// Remove and return the earliest event due at `now_ms`
    ///
    /// Callers loop on this so that an event handler can schedule follow-ups
    /// that are themselves already due.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<(TimerId, f64, E)> {
        if self.pending.first().is_some_and(|p| p.due_ms <= now_ms) {
            let p = self.pending.remove(0);
            Some((p.id, p.due_ms, p.event))
        } else {
            None
        }
    }
}

/// Fixed-step accumulator that turns frame timestamps into substeps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
    accumulator_ms: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fixed steps to run for a frame at `now_ms`
    pub fn steps(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_GAP_MS),
            None => STEP_MS,
        };
        self.last_ms = Some(now_ms);
        self.accumulator_ms += dt;

        let mut steps = 0;
        while self.accumulator_ms >= STEP_MS && steps < MAX_SUBSTEPS {
            self.accumulator_ms -= STEP_MS;
            steps += 1;
        }
        // Drop backlog the substep cap could not absorb
        if steps == MAX_SUBSTEPS {
            self.accumulator_ms = self.accumulator_ms.min(STEP_MS);
        }
        steps
    }

    /// Forget the previous timestamp (after the loop was paused)
    pub fn reset(&mut self) {
        self.last_ms = None;
        self.accumulator_ms = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(0.0, 300.0, "c");
        q.schedule(0.0, 100.0, "a");
        q.schedule(0.0, 200.0, "b");

        assert!(q.pop_due(50.0).is_none());
        let fired: Vec<_> = std::iter::from_fn(|| q.pop_due(1000.0).map(|(_, _, e)| e)).collect();
        assert_eq!(fired, vec!["a", "b", "c"]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_equal_deadlines_keep_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(0.0, 100.0, 1);
        q.schedule(0.0, 100.0, 2);
        q.schedule(50.0, 50.0, 3);
        let fired: Vec<_> = std::iter::from_fn(|| q.pop_due(100.0).map(|(_, _, e)| e)).collect();
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn test_cancel() {
        let mut q = TimerQueue::new();
        let a = q.schedule(0.0, 100.0, "a");
        let b = q.schedule(0.0, 200.0, "b");
        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert!(q.is_pending(b));
        assert_eq!(q.next_due(), Some(200.0));

        q.clear();
        assert!(q.pop_due(f64::MAX).is_none());
    }

    #[test]
    fn test_frame_clock_steps() {
        let mut clock = FrameClock::new();
        // First frame runs one step
        assert_eq!(clock.steps(0.0), 1);
        assert_eq!(clock.steps(17.0), 1);
        // Partial steps accumulate
        assert_eq!(clock.steps(25.0), 0);
        assert_eq!(clock.steps(34.0), 1);
    }

    #[test]
    fn test_frame_clock_caps_substeps() {
        let mut clock = FrameClock::new();
        clock.steps(0.0);
        // A long stall is clamped and capped
        assert_eq!(clock.steps(10_000.0), MAX_SUBSTEPS);
        // Backlog is not carried forward indefinitely
        assert!(clock.steps(10_000.0 + STEP_MS) <= 2);
    }

    #[test]
    fn test_frame_clock_reset_after_pause() {
        let mut clock = FrameClock::new();
        clock.steps(0.0);
        clock.steps(25.0);
        clock.reset();
        // Resuming after a pause runs one step, with no leftover partial step
        assert_eq!(clock.steps(60_000.0), 1);
        assert_eq!(clock.steps(60_000.0 + STEP_MS - 1.0), 0);
    }
}
