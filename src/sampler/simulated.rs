//! Synthetic RSSI generator for running without hardware.
//!
//! Each receiver follows `base + slow fading + multipath ringing + noise`.
//! The primary additionally suffers random blockage episodes that drag it
//! below the bad threshold for several seconds. The backup can be floored
//! just above the good margin so it is always a usable target.

use std::f64::consts::PI;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, NormalError};

use crate::config::SimulationConfig;
use crate::failover::{Receiver, Thresholds};
use crate::sampler::source::{SampleError, SignalSource};

/// Standard deviation of the jitter on the blocked level itself.
const BLOCKED_JITTER_DB: f64 = 2.0;
/// Above this envelope value the fade is fully blocked rather than blended.
const FULL_BLOCK_ALPHA: f64 = 0.6;

/// An in-progress blockage of the primary.
#[derive(Debug, Clone, Copy)]
struct Fade {
    start: Duration,
    duration: Duration,
    depth_dbm: f64,
}

impl Fade {
    /// Triangular envelope: 0 at the edges, 1 at the midpoint.
    fn alpha(&self, at: Duration) -> f64 {
        let total = self.duration.as_secs_f64().max(0.001);
        let progress = (at.saturating_sub(self.start).as_secs_f64() / total).clamp(0.0, 1.0);
        1.0 - (2.0 * progress - 1.0).abs()
    }

    fn is_over(&self, at: Duration) -> bool {
        at >= self.start + self.duration
    }
}

pub struct SimulatedSource {
    config: SimulationConfig,
    thresholds: Thresholds,
    rng: StdRng,
    noise: Normal<f64>,
    blocked_jitter: Normal<f64>,
    fade: Option<Fade>,
}

impl SimulatedSource {
    /// Fails when `noise_std_db` is negative or not finite.
    pub fn new(config: SimulationConfig, thresholds: Thresholds) -> Result<Self, NormalError> {
        let noise = Normal::new(0.0, config.noise_std_db)?;
        let blocked_jitter = Normal::new(0.0, BLOCKED_JITTER_DB)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            thresholds,
            rng,
            noise,
            blocked_jitter,
            fade: None,
        })
    }

    /// Whether a primary blockage is currently in progress.
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    fn baseline(&mut self, base_dbm: f64, at: Duration) -> f64 {
        let t = at.as_secs_f64();
        let fading = 8.0 * (t / 180.0).sin() + 4.0 * (t / 47.0).sin() + 2.0 * (t / 13.0).sin();
        let multipath =
            6.0 * (2.0 * PI * 15.0 * t).sin() * (-0.1 * (2.0 * PI * 0.3 * t).sin().abs()).exp();
        base_dbm + fading + multipath + self.noise.sample(&mut self.rng)
    }

    fn maybe_start_fade(&mut self, at: Duration) {
        if self.fade.is_some() || self.rng.gen::<f64>() >= self.config.blockage_probability {
            return;
        }
        let secs = self
            .rng
            .gen_range(self.config.blockage_min_secs..=self.config.blockage_max_secs);
        let bad = self.thresholds.bad_threshold;
        let depth_dbm = self.rng.gen_range((bad - 35.0)..=(bad + 5.0));
        tracing::info!(
            duration_secs = secs,
            depth_dbm = depth_dbm,
            "Primary blockage started"
        );
        self.fade = Some(Fade {
            start: at,
            duration: Duration::from_secs_f64(secs),
            depth_dbm,
        });
    }

    fn primary(&mut self, at: Duration) -> f64 {
        self.maybe_start_fade(at);
        let normal = self.baseline(self.config.primary_base_dbm, at);

        let Some(fade) = self.fade else {
            return normal;
        };

        let alpha = fade.alpha(at);
        let blocked = fade.depth_dbm + self.blocked_jitter.sample(&mut self.rng);
        let value = if alpha > FULL_BLOCK_ALPHA {
            blocked
        } else {
            (1.0 - alpha) * normal + alpha * blocked
        };

        if fade.is_over(at) {
            self.fade = None;
            tracing::info!("Primary blockage ended");
        }
        value
    }

    fn backup(&mut self, at: Duration) -> f64 {
        let raw = self.baseline(self.config.backup_base_dbm, at);
        if self.config.backup_floor {
            raw.max(self.thresholds.good_margin + 1.0)
        } else {
            raw
        }
    }
}

impl SignalSource for SimulatedSource {
    fn sample(&mut self, receiver: Receiver, at: Duration) -> Result<f64, SampleError> {
        Ok(match receiver {
            Receiver::Primary => self.primary(at),
            Receiver::Backup => self.backup(at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Thresholds = Thresholds {
        bad_threshold: -65.0,
        good_margin: -60.0,
    };

    fn config() -> SimulationConfig {
        SimulationConfig {
            seed: Some(7),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_backup_floor_holds() {
        let mut cfg = config();
        cfg.backup_base_dbm = -90.0;
        let mut source = SimulatedSource::new(cfg, T).unwrap();
        for i in 0..200 {
            let v = source.sample(Receiver::Backup, Duration::from_millis(250 * i)).unwrap();
            assert!(v >= -59.0, "backup {v} below floor");
        }
    }

    #[test]
    fn test_blockage_pulls_primary_down() {
        let mut cfg = config();
        cfg.blockage_probability = 1.0;
        cfg.blockage_min_secs = 4.0;
        cfg.blockage_max_secs = 4.0;
        cfg.noise_std_db = 0.0;
        let mut source = SimulatedSource::new(cfg, T).unwrap();

        source.sample(Receiver::Primary, Duration::ZERO).unwrap();
        assert!(source.is_fading());

        // Midpoint of the fade is fully blocked at depth <= bad + 5 (+ jitter).
        let mid = source.sample(Receiver::Primary, Duration::from_secs(2)).unwrap();
        assert!(mid < -50.0, "primary {mid} not blocked");

        source.sample(Receiver::Primary, Duration::from_secs(4)).unwrap();
        assert!(!source.is_fading());
    }

    #[test]
    fn test_seeded_sources_repeat() {
        let mut a = SimulatedSource::new(config(), T).unwrap();
        let mut b = SimulatedSource::new(config(), T).unwrap();
        for i in 0..50 {
            let at = Duration::from_millis(250 * i);
            assert_eq!(
                a.sample(Receiver::Primary, at).unwrap(),
                b.sample(Receiver::Primary, at).unwrap()
            );
        }
    }

    #[test]
    fn test_rejects_unusable_noise() {
        for std_dev in [-1.0, f64::NAN, f64::INFINITY] {
            let cfg = SimulationConfig {
                noise_std_db: std_dev,
                ..config()
            };
            assert!(SimulatedSource::new(cfg, T).is_err(), "accepted {std_dev}");
        }
    }

    #[test]
    fn test_noise_matches_configured_spread() {
        // At a fixed time every term but the noise is constant.
        let cfg = SimulationConfig {
            backup_floor: false,
            ..config()
        };
        let mut source = SimulatedSource::new(cfg.clone(), T).unwrap();
        let at = Duration::from_secs(60);
        let values: Vec<f64> = (0..4000)
            .map(|_| source.sample(Receiver::Backup, at).unwrap())
            .collect();

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        let std_dev = var.sqrt();
        assert!(
            (std_dev - cfg.noise_std_db).abs() < 0.2,
            "std dev {std_dev}, expected about {}",
            cfg.noise_std_db
        );
    }

    #[test]
    fn test_envelope_shape() {
        let fade = Fade {
            start: Duration::from_secs(10),
            duration: Duration::from_secs(4),
            depth_dbm: -90.0,
        };
        assert_eq!(fade.alpha(Duration::from_secs(10)), 0.0);
        assert_eq!(fade.alpha(Duration::from_secs(12)), 1.0);
        assert_eq!(fade.alpha(Duration::from_secs(14)), 0.0);
        assert!(fade.is_over(Duration::from_secs(14)));
    }
}
