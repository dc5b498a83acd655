//! Test utilities shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled only for tests or with the `test-support` feature.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

/// Clock that returns a settable instant and moves forward on demand.
pub struct StepClock {
    now: Mutex<DateTime<Utc>>,
    step: TimeDelta,
}

impl StepClock {
    /// Clock frozen at `now`.
    pub fn fixed(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            step: TimeDelta::zero(),
        }
    }

    /// Clock that advances by `step` after every reading.
    pub fn stepping(now: DateTime<Utc>, step: TimeDelta) -> Self {
        Self {
            now: Mutex::new(now),
            step,
        }
    }

    /// Move the clock forward.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.now.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for StepClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut now = self.lock_clock();
        let current = *now;
        *now += self.step;
        current
    }
}

/// Fixed instant used as the epoch of test scenarios.
pub fn fixture_timestamp() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).single() {
        Some(timestamp) => timestamp,
        None => panic!("valid fixture timestamp"),
    }
}
