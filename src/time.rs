// Clock abstraction for result timestamps

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use std::sync::Mutex;

/// Source of "now" for start/end bookkeeping
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        #[cfg(miri)]
        {
            DateTime::<Utc>::UNIX_EPOCH
        }
        #[cfg(not(miri))]
        {
            Utc::now()
        }
    }
}

/// Hand-driven clock for deterministic tests and log replay
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut current = self.lock();
        *current += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        // A poisoned clock still holds a valid timestamp
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

/// ISO-8601 with microseconds and an explicit `+00:00` offset
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Convert fractional unix seconds (as emitted by pytest-reportlog) to a timestamp
pub fn from_unix_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let micros = (secs * 1_000_000.0).round();
    if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_micros(micros as i64)
}

/// Fractional seconds as a duration; negative or non-finite input is zero
pub fn seconds_to_delta(secs: f64) -> TimeDelta {
    if !secs.is_finite() || secs <= 0.0 {
        return TimeDelta::zero();
    }
    let micros = (secs * 1_000_000.0).round().min(i64::MAX as f64);
    TimeDelta::microseconds(micros as i64)
}
