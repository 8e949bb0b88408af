//! Per-receiver dwell tracking.
//!
//! # States
//! ```text
//!           reading < bad_threshold
//!   Neutral ───────────────────────▶ Bad(since)
//!      ▲  │                            │
//!      │  │ reading > good_margin      │ reading > good_margin
//!      │  ▼                            ▼
//!      └── Good(since) ◀───────────────┘
//! ```
//! Any reading inside `[bad_threshold, good_margin]` returns to Neutral.
//! Re-entering the same condition keeps the original onset time.

use std::time::Duration;

/// Signal-strength thresholds. `good_margin > bad_threshold` is enforced by
/// config validation, leaving a dead zone between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub bad_threshold: f64,
    pub good_margin: f64,
}

impl Thresholds {
    pub fn classify(&self, reading: f64) -> Condition {
        if reading < self.bad_threshold {
            Condition::Bad
        } else if reading > self.good_margin {
            Condition::Good
        } else {
            Condition::Neutral
        }
    }

    pub fn is_good(&self, reading: f64) -> bool {
        reading > self.good_margin
    }
}

/// Classification of a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Bad,
    Good,
    /// Inside the dead zone, boundaries included.
    Neutral,
}

/// Onset times of the bad and good conditions for one receiver.
///
/// At most one of the two is set at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DwellTimers {
    bad_since: Option<Duration>,
    good_since: Option<Duration>,
}

impl DwellTimers {
    /// Fold one classified reading taken at `now` into the timers.
    pub fn observe(&mut self, condition: Condition, now: Duration) {
        match condition {
            Condition::Bad => {
                self.bad_since.get_or_insert(now);
                self.good_since = None;
            }
            Condition::Good => {
                self.good_since.get_or_insert(now);
                self.bad_since = None;
            }
            Condition::Neutral => {
                self.bad_since = None;
                self.good_since = None;
            }
        }
    }

    pub fn bad_since(&self) -> Option<Duration> {
        self.bad_since
    }

    pub fn good_since(&self) -> Option<Duration> {
        self.good_since
    }

    /// How long the receiver has been continuously bad.
    pub fn bad_for(&self, now: Duration) -> Option<Duration> {
        self.bad_since.map(|since| now.saturating_sub(since))
    }

    /// How long the receiver has been continuously good.
    pub fn good_for(&self, now: Duration) -> Option<Duration> {
        self.good_since.map(|since| now.saturating_sub(since))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Thresholds = Thresholds {
        bad_threshold: -65.0,
        good_margin: -60.0,
    };

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_boundaries_are_neutral() {
        assert_eq!(T.classify(-65.0), Condition::Neutral);
        assert_eq!(T.classify(-60.0), Condition::Neutral);
        assert_eq!(T.classify(-62.5), Condition::Neutral);
        assert_eq!(T.classify(-65.01), Condition::Bad);
        assert_eq!(T.classify(-59.99), Condition::Good);
    }

    #[test]
    fn test_onset_is_kept_while_condition_holds() {
        let mut d = DwellTimers::default();
        d.observe(Condition::Bad, secs(1.0));
        d.observe(Condition::Bad, secs(2.0));
        assert_eq!(d.bad_since(), Some(secs(1.0)));
        assert_eq!(d.bad_for(secs(2.5)), Some(secs(1.5)));
        assert_eq!(d.good_since(), None);
    }

    #[test]
    fn test_opposite_condition_clears_timer() {
        let mut d = DwellTimers::default();
        d.observe(Condition::Bad, secs(1.0));
        d.observe(Condition::Good, secs(2.0));
        assert_eq!(d.bad_since(), None);
        assert_eq!(d.good_since(), Some(secs(2.0)));
    }

    #[test]
    fn test_dead_zone_clears_both() {
        let mut d = DwellTimers::default();
        d.observe(Condition::Good, secs(1.0));
        d.observe(Condition::Neutral, secs(2.0));
        assert_eq!(d, DwellTimers::default());
        d.observe(Condition::Good, secs(3.0));
        assert_eq!(d.good_since(), Some(secs(3.0)));
    }
}
