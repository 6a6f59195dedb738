//! Created/updated timestamp lifecycle

use chrono::{DateTime, Utc};

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hooks run right before a record is written
pub trait LifecycleHooks {
    fn before_insert(&mut self, now: DateTime<Utc>);
    fn before_update(&mut self, now: DateTime<Utc>);
}

/// Bookkeeping timestamps of a persisted record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamps {
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Timestamps {
    pub fn new(created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self {
            created_at: Some(created_at),
            updated_at: Some(updated_at),
        }
    }
}

impl LifecycleHooks for Timestamps {
    fn before_insert(&mut self, now: DateTime<Utc>) {
        self.created_at = Some(now);
        self.updated_at = Some(now);
    }

    /// `created_at` is left alone; `updated_at` never moves backwards
    fn before_update(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(match self.updated_at {
            Some(previous) if previous > now => previous,
            _ => now,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn instant(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_insert_stamps_both() {
        let mut ts = Timestamps::default();
        ts.before_insert(instant(0));
        assert_eq!(ts.created_at, Some(instant(0)));
        assert_eq!(ts.created_at, ts.updated_at);
    }

    #[test]
    fn test_insert_overwrites_supplied_values() {
        let mut ts = Timestamps::new(instant(-100), instant(-50));
        ts.before_insert(instant(0));
        assert_eq!(ts, Timestamps::new(instant(0), instant(0)));
    }

    #[test]
    fn test_update_only_touches_updated_at() {
        let mut ts = Timestamps::default();
        ts.before_insert(instant(0));
        for step in 1..=3 {
            let previous = ts.updated_at;
            ts.before_update(instant(step * 10));
            assert_eq!(ts.created_at, Some(instant(0)));
            assert!(ts.updated_at >= previous);
            assert_eq!(ts.updated_at, Some(instant(step * 10)));
        }
    }

    #[test]
    fn test_update_never_goes_backwards() {
        let mut ts = Timestamps::new(instant(0), instant(60));
        ts.before_update(instant(60) - Duration::seconds(5));
        assert_eq!(ts.updated_at, Some(instant(60)));
    }

    #[test]
    fn test_system_clock_is_current() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }
}
