/// Cooldown gate: every timed action (moves, attacks, contact damage,
/// projectile steps, chest interaction) goes through `ready`.

/// Milliseconds on the host's monotonic clock.
pub type Millis = u64;

/// True once at least `min_interval` ms have passed since `last`.
/// A clock that appears to run backwards never makes a gate ready early.
#[inline]
pub fn ready(last: Millis, now: Millis, min_interval: Millis) -> bool {
    now.saturating_sub(last) >= min_interval
}

/// A gate with memory. `last == None` means the action has never fired
/// and is ready immediately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cooldown {
    interval: Millis,
    last: Option<Millis>,
}

impl Cooldown {
    pub fn new(interval: Millis) -> Self {
        Cooldown { interval, last: None }
    }

    /// A gate that behaves as if it fired at `now`.
    pub fn started_at(interval: Millis, now: Millis) -> Self {
        Cooldown { interval, last: Some(now) }
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<Millis> {
        self.last
    }

    pub fn is_ready(&self, now: Millis) -> bool {
        match self.last {
            None => true,
            Some(last) => ready(last, now, self.interval),
        }
    }

    pub fn trigger(&mut self, now: Millis) {
        self.last = Some(now);
    }

    /// Fire if ready. Returns whether the gate fired.
    pub fn try_trigger(&mut self, now: Millis) -> bool {
        if !self.is_ready(now) {
            return false;
        }
        self.trigger(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_exactly_at_boundary() {
        for &(last, interval) in &[(0u64, 120u64), (1_000, 220), (7, 1), (40_000, 500)] {
            assert!(!ready(last, last + interval - 1, interval));
            assert!(ready(last, last + interval, interval));
            assert!(ready(last, last + interval + 1, interval));
        }
        assert!(ready(5, 5, 0));
    }

    #[test]
    fn backwards_clock_is_not_ready() {
        assert!(!ready(1_000, 900, 50));
        assert!(ready(1_000, 900, 0));
    }

    #[test]
    fn fresh_gate_is_ready() {
        let cd = Cooldown::new(300);
        assert!(cd.is_ready(0));
        assert_eq!(cd.last(), None);
    }

    #[test]
    fn try_trigger_blocks_until_interval() {
        let mut cd = Cooldown::new(180);
        assert!(cd.try_trigger(10));
        assert!(!cd.try_trigger(100));
        assert!(!cd.try_trigger(189));
        assert_eq!(cd.last(), Some(10));
        assert!(cd.try_trigger(190));
        assert_eq!(cd.last(), Some(190));
    }

    #[test]
    fn started_at_delays_first_fire() {
        let cd = Cooldown::started_at(140, 1_000);
        assert!(!cd.is_ready(1_000));
        assert!(!cd.is_ready(1_139));
        assert!(cd.is_ready(1_140));
    }
}
