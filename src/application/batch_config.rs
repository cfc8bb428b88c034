//! Concurrency cap and pacing between batches
//!
//! Validated once before a run starts and immutable afterwards.

use std::num::NonZeroUsize;
use std::time::Duration;

use crate::domain::{PurgeError, PurgeResult};

/// Delay applied between two batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    Fixed(Duration),
    Random { min: Duration, max: Duration },
}

impl Pacing {
    pub fn fixed_secs(seconds: f64) -> PurgeResult<Self> {
        Ok(Self::Fixed(seconds_to_duration("timeout", seconds)?))
    }

    pub fn random_secs(min_seconds: f64, max_seconds: f64) -> PurgeResult<Self> {
        let min = seconds_to_duration("random_timeout", min_seconds)?;
        let max = seconds_to_duration("random_timeout", max_seconds)?;
        if min > max {
            return Err(PurgeError::configuration(
                "random_timeout",
                format!("bounds must satisfy 0 <= min <= max, got {min_seconds} > {max_seconds}"),
            ));
        }
        Ok(Self::Random { min, max })
    }

    /// Length of the next pause. Random pacing samples uniformly from
    /// `[min, max)`; the upper bound itself is never drawn unless `min == max`.
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::Random { min, max } => {
                let span = max.saturating_sub(min);
                min + span.mul_f64(fastrand::f64())
            }
        }
    }
}

fn seconds_to_duration(field: &str, seconds: f64) -> PurgeResult<Duration> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(PurgeError::configuration(
            field,
            format!("seconds must be a finite value >= 0, got {seconds}"),
        ));
    }
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| PurgeError::configuration(field, format!("{e}, got {seconds}")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfiguration {
    max_concurrent_tasks: NonZeroUsize,
    pacing: Pacing,
}

impl BatchConfiguration {
    pub fn new(max_concurrent_tasks: usize, pacing: Pacing) -> PurgeResult<Self> {
        let max_concurrent_tasks = NonZeroUsize::new(max_concurrent_tasks).ok_or_else(|| {
            PurgeError::configuration("max_tasks", "at least one concurrent task is required")
        })?;
        Ok(Self {
            max_concurrent_tasks,
            pacing,
        })
    }

    /// Build from raw settings; a random range takes precedence over the fixed delay.
    pub fn from_settings(
        max_tasks: usize,
        timeout_seconds: f64,
        random_timeout: Option<(f64, f64)>,
    ) -> PurgeResult<Self> {
        let pacing = match random_timeout {
            Some((min, max)) => Pacing::random_secs(min, max)?,
            None => Pacing::fixed_secs(timeout_seconds)?,
        };
        Self::new(max_tasks, pacing)
    }

    #[must_use]
    pub const fn max_concurrent_tasks(&self) -> usize {
        self.max_concurrent_tasks.get()
    }

    #[must_use]
    pub const fn pacing(&self) -> &Pacing {
        &self.pacing
    }
}

impl Default for BatchConfiguration {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: NonZeroUsize::MIN,
            pacing: Pacing::Fixed(Duration::from_secs(1)),
        }
    }
}
