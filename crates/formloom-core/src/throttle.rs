#![forbid(unsafe_code)]

//! Cooldown gate for rapid-fire requests.
//!
//! A double activation of the same palette entry arrives as two add requests
//! a few milliseconds apart. [`CooldownGate`] admits the first and rejects
//! any request with the same key until the cooldown window has elapsed since
//! the last *admitted* request. Requests with a different key are admitted
//! immediately and become the new reference.
//!
//! The gate never queues: a rejected request is simply coalesced into the
//! one already admitted.
//!
//! Time is injected by the caller so the gate is deterministic under test.

use std::time::Duration;

use web_time::Instant;

/// Default add cooldown window.
pub const DEFAULT_ADD_COOLDOWN: Duration = Duration::from_millis(300);

/// Decision returned by [`CooldownGate::admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The request should be executed.
    Admitted,
    /// The request repeats the previous one inside the window and is dropped.
    Coalesced {
        /// Time since the last admitted request with the same key.
        since_last: Duration,
    },
}

impl GateDecision {
    /// Whether the request should be executed.
    #[inline]
    #[must_use]
    pub const fn is_admitted(self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Keyed cooldown gate. Single-threaded; one instance per command surface.
#[derive(Debug, Clone)]
pub struct CooldownGate<K> {
    window: Duration,
    last: Option<(K, Instant)>,
}

impl<K: PartialEq> CooldownGate<K> {
    /// Create a gate with the given window. A zero window admits everything.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Current cooldown window.
    #[inline]
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Change the cooldown window. Takes effect for the next request.
    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    /// Decide whether a request with `key` arriving at `now` is admitted.
    ///
    /// Admitted requests become the new reference point.
    pub fn admit(&mut self, key: K, now: Instant) -> GateDecision {
        if let Some((last_key, last_at)) = &self.last
            && *last_key == key
        {
            let since_last = now.saturating_duration_since(*last_at);
            if since_last < self.window {
                return GateDecision::Coalesced { since_last };
            }
        }
        self.last = Some((key, now));
        GateDecision::Admitted
    }

    /// Forget the last admitted request.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl<K: PartialEq> Default for CooldownGate<K> {
    fn default() -> Self {
        Self::new(DEFAULT_ADD_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn same_key_inside_window_is_coalesced() {
        let t0 = Instant::now();
        let mut gate = CooldownGate::new(ms(300));
        assert!(gate.admit("text", t0).is_admitted());
        assert_eq!(
            gate.admit("text", t0 + ms(120)),
            GateDecision::Coalesced {
                since_last: ms(120)
            }
        );
    }

    #[test]
    fn same_key_after_window_is_admitted() {
        let t0 = Instant::now();
        let mut gate = CooldownGate::new(ms(300));
        assert!(gate.admit("text", t0).is_admitted());
        assert!(gate.admit("text", t0 + ms(300)).is_admitted());
    }

    #[test]
    fn coalesced_requests_do_not_extend_the_window() {
        let t0 = Instant::now();
        let mut gate = CooldownGate::new(ms(300));
        assert!(gate.admit(1, t0).is_admitted());
        assert!(!gate.admit(1, t0 + ms(200)).is_admitted());
        // Measured from the admitted request, not the coalesced one.
        assert!(gate.admit(1, t0 + ms(310)).is_admitted());
    }

    #[test]
    fn different_key_is_admitted_and_becomes_reference() {
        let t0 = Instant::now();
        let mut gate = CooldownGate::new(ms(300));
        assert!(gate.admit("a", t0).is_admitted());
        assert!(gate.admit("b", t0 + ms(10)).is_admitted());
        assert!(gate.admit("a", t0 + ms(20)).is_admitted());
    }

    #[test]
    fn zero_window_admits_everything() {
        let t0 = Instant::now();
        let mut gate = CooldownGate::new(Duration::ZERO);
        assert!(gate.admit("a", t0).is_admitted());
        assert!(gate.admit("a", t0).is_admitted());
    }

    #[test]
    fn reset_forgets_reference() {
        let t0 = Instant::now();
        let mut gate = CooldownGate::default();
        assert!(gate.admit("a", t0).is_admitted());
        gate.reset();
        assert!(gate.admit("a", t0 + ms(1)).is_admitted());
    }

    #[test]
    fn clock_going_backwards_is_treated_as_zero_elapsed() {
        let t0 = Instant::now() + ms(1_000);
        let mut gate = CooldownGate::new(ms(300));
        assert!(gate.admit("a", t0).is_admitted());
        assert_eq!(
            gate.admit("a", t0 - ms(500)),
            GateDecision::Coalesced {
                since_last: Duration::ZERO
            }
        );
    }
}
