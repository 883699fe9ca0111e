//! Relevance rank from popularity and recency.
//!
//! ```text
//! rank = (likes + historical_likes + 1) * LIKES_WEIGHT
//!      + (views + historical_views)     * VIEWS_WEIGHT
//!      + (1 / age_secs)                 * RECENCY_WEIGHT
//! ```
//!
//! `age_secs` is clamped to at least [`MIN_AGE_SECS`] so a brand-new asset
//! (or one with a clock-skewed creation time) gets a finite score.

use crate::types::Timestamp;

pub const LIKES_WEIGHT: f64 = 100.0;
pub const VIEWS_WEIGHT: f64 = 0.1;
pub const RECENCY_WEIGHT: f64 = 1.0;

/// Lower bound on asset age used by the recency term.
pub const MIN_AGE_SECS: f64 = 1.0;

/// Popularity counters that feed the rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankInputs {
    pub likes: i64,
    pub historical_likes: i64,
    pub views: i64,
    pub historical_views: i64,
}

/// Compute the rank of an asset created at `create_time`, as of `now`.
pub fn compute_rank(
    likes: i64,
    historical_likes: i64,
    views: i64,
    historical_views: i64,
    create_time: Timestamp,
    now: Timestamp,
) -> f64 {
    let age_secs = (now - create_time).num_milliseconds() as f64 / 1000.0;
    let age_secs = age_secs.max(MIN_AGE_SECS);

    (likes + historical_likes + 1) as f64 * LIKES_WEIGHT
        + (views + historical_views) as f64 * VIEWS_WEIGHT
        + (1.0 / age_secs) * RECENCY_WEIGHT
}

impl RankInputs {
    /// [`compute_rank`] over these counters.
    pub fn rank(&self, create_time: Timestamp, now: Timestamp) -> f64 {
        compute_rank(
            self.likes,
            self.historical_likes,
            self.views,
            self.historical_views,
            create_time,
            now,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
