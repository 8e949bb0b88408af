//! The failover decision engine.
//!
//! # Responsibilities
//! - Fold each tick's readings into per-receiver dwell timers
//! - Decide whether the active receiver changes
//! - Rate-limit transitions with a global debounce
//!
//! # Policy
//! ```text
//! Primary → Backup: primary bad for >= bad_hold AND backup good right now
//! Backup → Primary: primary good for >= good_hold AND primary good right now
//! Either direction: time since last transition > debounce
//! ```
//!
//! The policy is primary-preferred. A degraded backup is never failed away
//! from, since there is nothing better to go to.

use std::time::Duration;

use serde::Serialize;

use crate::failover::dwell::{DwellTimers, Thresholds};
use crate::failover::receiver::{Readings, Receiver, Transition};

/// Validated decision parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Policy {
    pub thresholds: Thresholds,
    /// Continuous bad time required before failing away from the primary.
    pub bad_hold: Duration,
    /// Continuous good time required before failing back to the primary.
    pub good_hold: Duration,
    /// Minimum spacing between any two transitions.
    pub debounce: Duration,
}

/// Cumulative transition counts per direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransitionCounts {
    pub failovers: u64,
    pub failbacks: u64,
}

impl TransitionCounts {
    fn record(&mut self, transition: &Transition) {
        if transition.is_failover() {
            self.failovers += 1;
        } else {
            self.failbacks += 1;
        }
    }

    /// Count for the `from → to` direction. Zero for a self-transition.
    pub fn get(&self, from: Receiver, to: Receiver) -> u64 {
        match (from, to) {
            (Receiver::Primary, Receiver::Backup) => self.failovers,
            (Receiver::Backup, Receiver::Primary) => self.failbacks,
            _ => 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.failovers + self.failbacks
    }
}

/// Everything the controller remembers between ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    active: Receiver,
    last_switch: Option<Duration>,
    last_transition: Option<Transition>,
    dwell: [DwellTimers; 2],
    counts: TransitionCounts,
}

impl ControllerState {
    fn new(active: Receiver) -> Self {
        Self {
            active,
            last_switch: None,
            last_transition: None,
            dwell: [DwellTimers::default(); 2],
            counts: TransitionCounts::default(),
        }
    }

    pub fn active(&self) -> Receiver {
        self.active
    }

    pub fn last_transition(&self) -> Option<Transition> {
        self.last_transition
    }

    pub fn dwell(&self, receiver: Receiver) -> &DwellTimers {
        &self.dwell[receiver.index()]
    }

    pub fn counts(&self) -> TransitionCounts {
        self.counts
    }
}

/// Hysteresis-plus-debounce failover controller for a primary/backup pair.
///
/// Owned by the polling loop; [`step`](Self::step) is called exactly once
/// per tick.
#[derive(Debug, Clone)]
pub struct FailoverController {
    policy: Policy,
    state: ControllerState,
}

impl FailoverController {
    pub fn new(policy: Policy, initial: Receiver) -> Self {
        Self {
            policy,
            state: ControllerState::new(initial),
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn active(&self) -> Receiver {
        self.state.active
    }

    /// Run one tick: update dwell timers for every receiver, then apply
    /// the transition rule. Returns the transition if one happened.
    pub fn step(&mut self, readings: &Readings) -> Option<Transition> {
        self.update_conditions(readings);

        let target = self.evaluate(readings)?;
        let transition = Transition {
            from: self.state.active,
            to: target,
            at: readings.at,
        };

        self.state.active = target;
        self.state.last_switch = Some(readings.at);
        self.state.last_transition = Some(transition);
        self.state.counts.record(&transition);

        tracing::debug!(
            from = %transition.from,
            to = %transition.to,
            at_secs = transition.at.as_secs_f64(),
            "Transition recorded"
        );
        Some(transition)
    }

    fn update_conditions(&mut self, readings: &Readings) {
        let thresholds = self.policy.thresholds;
        for receiver in Receiver::ALL {
            // A missing reading keeps whatever the timers already say.
            if let Some(value) = readings.get(receiver) {
                self.state.dwell[receiver.index()].observe(thresholds.classify(value), readings.at);
            }
        }
    }

    fn debounce_elapsed(&self, now: Duration) -> bool {
        match self.state.last_switch {
            Some(last) => now.saturating_sub(last) > self.policy.debounce,
            None => true,
        }
    }

    /// The receiver to switch to, if the rule fires this tick.
    fn evaluate(&self, readings: &Readings) -> Option<Receiver> {
        let now = readings.at;
        if !self.debounce_elapsed(now) {
            return None;
        }

        let thresholds = self.policy.thresholds;
        let primary = self.state.dwell(Receiver::Primary);

        match self.state.active {
            Receiver::Primary => {
                let held = primary.bad_for(now).is_some_and(|d| d >= self.policy.bad_hold);
                let backup_good = readings
                    .get(Receiver::Backup)
                    .is_some_and(|v| thresholds.is_good(v));
                (held && backup_good).then_some(Receiver::Backup)
            }
            Receiver::Backup => {
                let held = primary.good_for(now).is_some_and(|d| d >= self.policy.good_hold);
                let primary_good = readings
                    .get(Receiver::Primary)
                    .is_some_and(|v| thresholds.is_good(v));
                (held && primary_good).then_some(Receiver::Primary)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK_MS: u64 = 250;

    fn policy() -> Policy {
        Policy {
            thresholds: Thresholds {
                bad_threshold: -65.0,
                good_margin: -60.0,
            },
            bad_hold: Duration::from_millis(1500),
            good_hold: Duration::from_millis(5000),
            debounce: Duration::from_millis(200),
        }
    }

    /// Drive the controller at a fixed cadence, collecting transitions.
    fn drive<F>(c: &mut FailoverController, tick: Duration, ticks: u32, mut f: F) -> Vec<Transition>
    where
        F: FnMut(Duration) -> (Option<f64>, Option<f64>),
    {
        let mut out = Vec::new();
        for i in 0..ticks {
            let at = tick * i;
            let (p, b) = f(at);
            let mut r = Readings::new(at);
            r.set(Receiver::Primary, p);
            r.set(Receiver::Backup, b);
            out.extend(c.step(&r));
        }
        out
    }

    #[test]
    fn test_failover_after_bad_hold() {
        let mut c = FailoverController::new(policy(), Receiver::Primary);
        let tick = Duration::from_millis(TICK_MS);
        let ts = drive(&mut c, tick, 9, |_| (Some(-70.0), Some(-55.0)));

        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].from, Receiver::Primary);
        assert_eq!(ts[0].to, Receiver::Backup);
        assert_eq!(ts[0].at, Duration::from_millis(1500));
        assert_eq!(c.state().counts().get(Receiver::Primary, Receiver::Backup), 1);
    }

    #[test]
    fn test_failback_after_good_hold() {
        let mut c = FailoverController::new(policy(), Receiver::Backup);
        let tick = Duration::from_millis(TICK_MS);
        let ts = drive(&mut c, tick, 25, |_| (Some(-50.0), Some(-55.0)));

        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].to, Receiver::Primary);
        assert_eq!(ts[0].at, Duration::from_secs(5));
        assert_eq!(c.state().counts().failbacks, 1);
    }

    #[test]
    fn test_no_failover_into_bad_backup() {
        let mut c = FailoverController::new(policy(), Receiver::Primary);
        let tick = Duration::from_millis(TICK_MS);
        let ts = drive(&mut c, tick, 40, |_| (Some(-75.0), Some(-75.0)));
        assert!(ts.is_empty());
        assert_eq!(c.active(), Receiver::Primary);
    }

    #[test]
    fn test_backup_in_dead_zone_is_not_a_target() {
        let mut c = FailoverController::new(policy(), Receiver::Primary);
        let tick = Duration::from_millis(TICK_MS);
        let ts = drive(&mut c, tick, 20, |_| (Some(-70.0), Some(-60.0)));
        assert!(ts.is_empty());
    }

    #[test]
    fn test_degraded_backup_is_never_left_for_dead_zone_primary() {
        let mut c = FailoverController::new(policy(), Receiver::Backup);
        let tick = Duration::from_millis(TICK_MS);
        let ts = drive(&mut c, tick, 40, |_| (Some(-62.0), Some(-80.0)));
        assert!(ts.is_empty());
        assert_eq!(c.active(), Receiver::Backup);
    }

    #[test]
    fn test_oscillating_primary_never_switches() {
        let mut c = FailoverController::new(policy(), Receiver::Primary);
        let tick = Duration::from_millis(100);
        let ts = drive(&mut c, tick, 200, |at| {
            let p = if (at.as_millis() / 100) % 2 == 0 { -70.0 } else { -50.0 };
            (Some(p), Some(-55.0))
        });
        assert!(ts.is_empty());
    }

    #[test]
    fn test_debounce_blocks_immediate_failback() {
        let mut p = policy();
        p.good_hold = Duration::ZERO;
        p.bad_hold = Duration::ZERO;
        p.debounce = Duration::from_secs(1);
        let mut c = FailoverController::new(p, Receiver::Primary);

        let bad = Readings::both(-70.0, -55.0, Duration::from_secs(10));
        assert!(c.step(&bad).is_some());

        // Primary recovers instantly; zero good hold, but debounce holds.
        let good = Readings::both(-50.0, -55.0, Duration::from_millis(10_500));
        assert!(c.step(&good).is_none());
        let equal = Readings::both(-50.0, -55.0, Duration::from_secs(11));
        assert!(c.step(&equal).is_none(), "debounce is a strict bound");
        let after = Readings::both(-50.0, -55.0, Duration::from_millis(11_250));
        let t = c.step(&after).expect("failback after debounce");
        assert_eq!(t.to, Receiver::Primary);
    }

    #[test]
    fn test_backup_timers_tracked_while_primary_active() {
        let mut c = FailoverController::new(policy(), Receiver::Primary);
        c.step(&Readings::both(-50.0, -80.0, Duration::from_secs(1)));
        c.step(&Readings::both(-50.0, -80.0, Duration::from_secs(2)));
        assert_eq!(
            c.state().dwell(Receiver::Backup).bad_since(),
            Some(Duration::from_secs(1))
        );
    }

    #[test]
    fn test_missing_reading_retains_dwell() {
        let mut c = FailoverController::new(policy(), Receiver::Primary);
        c.step(&Readings::both(-70.0, -55.0, Duration::ZERO));

        let mut gap = Readings::new(Duration::from_millis(500));
        gap.set(Receiver::Backup, Some(-55.0));
        assert!(c.step(&gap).is_none());
        assert_eq!(c.state().dwell(Receiver::Primary).bad_since(), Some(Duration::ZERO));

        let t = c.step(&Readings::both(-70.0, -55.0, Duration::from_millis(1500)));
        assert!(t.is_some_and(|t| t.is_failover()));
    }

    #[test]
    fn test_missing_backup_reading_blocks_failover() {
        let mut c = FailoverController::new(policy(), Receiver::Primary);
        let tick = Duration::from_millis(TICK_MS);
        let ts = drive(&mut c, tick, 20, |_| (Some(-70.0), None));
        assert!(ts.is_empty());
    }
}
