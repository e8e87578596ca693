use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use crate::movie::Movie;

/// Cached result of the "popular movies" query
///
/// `timestamp` is epoch milliseconds at the time the entry was written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopularMoviesCache {
    pub data: Vec<Movie>,
    pub timestamp: i64,
}

impl PopularMoviesCache {
    pub fn new(data: Vec<Movie>, written_at: DateTime<Utc>) -> Self {
        Self {
            data,
            timestamp: written_at.timestamp_millis(),
        }
    }

    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// `None` when the stored timestamp is too far from `now` to represent
    pub fn age_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        now.timestamp_millis()
            .checked_sub(self.timestamp)
            .and_then(Duration::try_milliseconds)
    }

    /// An entry is fresh while its age is at least zero and strictly below `ttl`
    ///
    /// Timestamps in the future or out of range make the entry stale.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match self.age_at(now) {
            Some(age) => age >= Duration::zero() && age < ttl,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freshness_boundary() {
        let now = Utc::now();
        let ttl = Duration::hours(1);

        let stale = PopularMoviesCache {
            data: vec![],
            timestamp: now.timestamp_millis() - 3_600_001,
        };
        let exactly_ttl = PopularMoviesCache {
            data: vec![],
            timestamp: now.timestamp_millis() - 3_600_000,
        };
        let fresh = PopularMoviesCache {
            data: vec![],
            timestamp: now.timestamp_millis() - 1_000,
        };

        assert!(!stale.is_fresh(now, ttl));
        assert!(!exactly_ttl.is_fresh(now, ttl));
        assert!(fresh.is_fresh(now, ttl));
    }

    #[test]
    fn test_out_of_range_timestamps_are_stale() {
        let now = Utc::now();
        let ttl = Duration::hours(1);

        for timestamp in [i64::MIN, i64::MAX, now.timestamp_millis() + 60_000] {
            let entry = PopularMoviesCache { data: vec![], timestamp };
            assert!(!entry.is_fresh(now, ttl), "timestamp {} should be stale", timestamp);
        }
        assert_eq!(PopularMoviesCache { data: vec![], timestamp: i64::MIN }.age_at(now), None);
    }

    #[test]
    fn test_wire_format() {
        let written_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let cache = PopularMoviesCache::new(vec![Movie::new("tt1", "Heat")], written_at);
        let json = serde_json::to_value(&cache).unwrap();
        assert_eq!(json["timestamp"], 1_700_000_000_000i64);
        assert_eq!(json["data"][0]["id"], "tt1");
        assert_eq!(cache.written_at(), Some(written_at));
    }
}
