//! Simulated dashboard metrics.
//!
//! Each metric is a plain value with a pure next-state transform ([`Drift`])
//! that draws from an injected random source. A [`Ticker`] drives the
//! transform on a fixed period, so a seeded RNG replays the same series.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Readings at or above this temperature (mK) are critical.
pub const CRITICAL_TEMP_MK: f64 = 14.0;

const MIN_TEMP_MK: f64 = 8.0;
const MAX_TEMP_MK: f64 = 14.5;

/// A metric whose next value depends only on the current one and `rng`.
pub trait Drift: Sized {
    fn next(&self, rng: &mut impl Rng) -> Self;
}

/// Cryostat core temperatures in millikelvin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreTemps {
    pub readings: Vec<f64>,
    /// Cooling efficiency multiplier applied each tick.
    pub efficiency: f64,
}

impl Default for CoreTemps {
    fn default() -> Self {
        Self {
            readings: vec![10.53, 11.12, 13.98, 10.77],
            efficiency: 1.0,
        }
    }
}

impl CoreTemps {
    pub fn with_efficiency(efficiency: f64) -> Self {
        Self {
            efficiency,
            ..Self::default()
        }
    }

    /// Readings at or above [`CRITICAL_TEMP_MK`].
    pub fn critical(&self) -> Vec<f64> {
        self.readings
            .iter()
            .copied()
            .filter(|t| *t >= CRITICAL_TEMP_MK)
            .collect()
    }
}

impl Drift for CoreTemps {
    fn next(&self, rng: &mut impl Rng) -> Self {
        let readings = self
            .readings
            .iter()
            .map(|r| {
                let jitter = (rng.gen::<f64>() - 0.5) * 0.2;
                (r * self.efficiency + jitter).clamp(MIN_TEMP_MK, MAX_TEMP_MK)
            })
            .collect();
        Self {
            readings,
            efficiency: self.efficiency,
        }
    }
}

impl fmt::Display for CoreTemps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let readings: Vec<String> = self.readings.iter().map(|t| format!("{t:.2}")).collect();
        write!(f, "core temps (mK): {}", readings.join(", "))
    }
}

/// Quantum key distribution link state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QkdStatus {
    #[default]
    Active,
    Error,
}

impl fmt::Display for QkdStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QkdStatus::Active => write!(f, "ACTIVE"),
            QkdStatus::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub qubit_error_rate: f64,
    pub system_load: f64,
    pub qkd_status: QkdStatus,
}

impl Default for SystemHealth {
    fn default() -> Self {
        Self {
            qubit_error_rate: 0.005,
            system_load: 0.5,
            qkd_status: QkdStatus::Active,
        }
    }
}

impl Drift for SystemHealth {
    fn next(&self, rng: &mut impl Rng) -> Self {
        let qubit_error_rate =
            (self.qubit_error_rate + (rng.gen::<f64>() - 0.5) * 0.001).clamp(0.001, 0.02);
        let system_load = (self.system_load + (rng.gen::<f64>() - 0.5) * 0.1).clamp(0.1, 1.0);
        let qkd_status = if rng.gen_bool(0.05) {
            QkdStatus::Error
        } else {
            QkdStatus::Active
        };
        Self {
            qubit_error_rate,
            system_load,
            qkd_status,
        }
    }
}

impl fmt::Display for SystemHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error rate {:.3}%  load {:.0}%  QKD {}",
            self.qubit_error_rate * 100.0,
            self.system_load * 100.0,
            self.qkd_status
        )
    }
}

/// Drives a [`Drift`] metric on a fixed period.
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    period: Duration,
}

impl Ticker {
    /// A zero period is raised to one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Advance `initial` `ticks` times, waiting one period before each step
    /// and calling `on_tick` with the 1-based tick number and new state.
    pub async fn run<T, R, F>(&self, initial: T, rng: &mut R, ticks: u64, mut on_tick: F) -> T
    where
        T: Drift,
        R: Rng,
        F: FnMut(u64, &T),
    {
        let mut interval = tokio::time::interval(self.period);
        // The first tick of a tokio interval completes immediately.
        interval.tick().await;

        let mut state = initial;
        for tick in 1..=ticks {
            interval.tick().await;
            state = state.next(rng);
            on_tick(tick, &state);
        }
        tracing::debug!(ticks, "ticker finished");
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn core_temps_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut temps = CoreTemps::with_efficiency(1.2);
        for _ in 0..500 {
            temps = temps.next(&mut rng);
            assert!(temps.readings.iter().all(|t| (8.0..=14.5).contains(t)));
        }
        // Runaway heating pins every reading at the ceiling.
        assert!(temps.critical().len() == 4);
    }

    #[test]
    fn core_temps_cool_to_floor() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut temps = CoreTemps::with_efficiency(0.5);
        for _ in 0..20 {
            temps = temps.next(&mut rng);
        }
        assert!(temps.readings.iter().all(|t| *t == 8.0));
        assert!(temps.critical().is_empty());
    }

    #[test]
    fn default_critical_readings() {
        let temps = CoreTemps {
            readings: vec![10.0, 14.0, 14.2],
            efficiency: 1.0,
        };
        assert_eq!(temps.critical(), vec![14.0, 14.2]);
        assert!(CoreTemps::default().critical().is_empty());
    }

    #[test]
    fn health_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut health = SystemHealth::default();
        let mut saw_error = false;
        for _ in 0..1000 {
            health = health.next(&mut rng);
            assert!((0.001..=0.02).contains(&health.qubit_error_rate));
            assert!((0.1..=1.0).contains(&health.system_load));
            saw_error |= health.qkd_status == QkdStatus::Error;
        }
        assert!(saw_error);
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut health = SystemHealth::default();
            for _ in 0..10 {
                health = health.next(&mut rng);
            }
            health
        };
        assert_eq!(run(3), run(3));
    }

    #[test]
    fn zero_period_is_raised() {
        assert_eq!(Ticker::new(Duration::ZERO).period(), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn ticker_reports_every_tick() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = Vec::new();
        let last = Ticker::from_millis(1)
            .run(CoreTemps::default(), &mut rng, 3, |tick, state| {
                seen.push((tick, state.clone()));
            })
            .await;

        assert_eq!(seen.iter().map(|(t, _)| *t).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(seen[2].1, last);

        let mut replay = StdRng::seed_from_u64(9);
        let mut expected = CoreTemps::default();
        for _ in 0..3 {
            expected = expected.next(&mut replay);
        }
        assert_eq!(last, expected);
    }

    #[tokio::test]
    async fn zero_ticks_returns_initial() {
        let mut rng = StdRng::seed_from_u64(0);
        let health = Ticker::from_millis(1)
            .run(SystemHealth::default(), &mut rng, 0, |_, _| {})
            .await;
        assert_eq!(health, SystemHealth::default());
    }
}
