//! Per-subscriber daily query limit for the mobile bill endpoint.

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use tracing::warn;

use telbill_shared::error::AppError;

use crate::{AppState, routes::failure};

/// Counts bill queries per subscriber per calendar day.
///
/// One entry per subscriber; the counter resets in place when the stored
/// day is no longer today, so the map never grows beyond the subscriber
/// population.
#[derive(Debug)]
pub struct QueryLimiter {
    limit: u32,
    counters: DashMap<String, (NaiveDate, u32)>,
}

impl QueryLimiter {
    /// Creates a limiter allowing `limit` queries per subscriber per day.
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            counters: DashMap::new(),
        }
    }

    /// Records one query for `subscriber_no` today.
    ///
    /// Returns `false` when the subscriber has already used up today's
    /// allowance; a rejected query does not consume a slot.
    pub fn try_acquire(&self, subscriber_no: &str) -> bool {
        self.try_acquire_on(subscriber_no, Utc::now().date_naive())
    }

    fn try_acquire_on(&self, subscriber_no: &str, today: NaiveDate) -> bool {
        let mut entry = self
            .counters
            .entry(subscriber_no.to_string())
            .or_insert((today, 0));

        let (day, count) = *entry;
        if day != today {
            *entry = (today, 1);
            return true;
        }
        if count >= self.limit {
            return false;
        }
        *entry = (today, count + 1);
        true
    }
}

#[derive(Deserialize)]
struct SubscriberQuery {
    subscriber_no: Option<String>,
}

/// Enforces the daily per-subscriber query allowance.
///
/// The subscriber is identified by the `subscriber_no` query parameter;
/// a request without one is rejected up front so it cannot bypass the
/// limit.
pub async fn query_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let subscriber_no = Query::<SubscriberQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|q| q.0.subscriber_no);

    let Some(subscriber_no) = subscriber_no.filter(|s| !s.is_empty()) else {
        return failure(&AppError::Validation(
            "subscriber_no query parameter is required".into(),
        ));
    };

    if !state.query_limiter.try_acquire(&subscriber_no) {
        warn!(subscriber_no, "daily bill query limit exceeded");
        return failure(&AppError::RateLimited(
            "Daily query limit for this subscriber has been reached".into(),
        ));
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    #[test]
    fn test_limit_enforced_within_one_day() {
        let limiter = QueryLimiter::new(3);
        assert!(limiter.try_acquire_on("5551234567", day(1)));
        assert!(limiter.try_acquire_on("5551234567", day(1)));
        assert!(limiter.try_acquire_on("5551234567", day(1)));
        assert!(!limiter.try_acquire_on("5551234567", day(1)));
        assert!(!limiter.try_acquire_on("5551234567", day(1)));
    }

    #[test]
    fn test_counter_rolls_over_at_midnight() {
        let limiter = QueryLimiter::new(3);
        for _ in 0..3 {
            assert!(limiter.try_acquire_on("5551234567", day(1)));
        }
        assert!(!limiter.try_acquire_on("5551234567", day(1)));

        // A new day grants a fresh allowance.
        assert!(limiter.try_acquire_on("5551234567", day(2)));
    }

    #[test]
    fn test_subscribers_counted_independently() {
        let limiter = QueryLimiter::new(1);
        assert!(limiter.try_acquire_on("a", day(1)));
        assert!(limiter.try_acquire_on("b", day(1)));
        assert!(!limiter.try_acquire_on("a", day(1)));
    }
}
