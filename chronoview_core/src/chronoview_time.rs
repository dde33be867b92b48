//! The "TIME" Engine - Temporal index lookup
//!
//! Every frame source answers "what does the data look like at time t?".
//! This module turns a query time into sample indices over a sorted
//! (non-decreasing) timestamp sequence:
//! - nearest sample, for sources that snap to a single sample
//! - bracketing pair, for sources that interpolate between samples
//! - window range, for sources that accumulate everything inside a window
//!
//! All lookups are binary searches; recordings can hold millions of samples.

use std::ops::Range;

/// Where a query time falls relative to a timestamp sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bracket {
    /// The sequence holds no timestamps
    Empty,

    /// Query is strictly before the first timestamp
    Before,

    /// Query equals the timestamp at this index (rightmost on duplicates)
    Exact(usize),

    /// Query lies strictly between two neighbouring samples
    Between {
        pre: usize,
        post: usize,
        /// Relative position of the query from `pre` (0) to `post` (1)
        fraction: f64,
    },

    /// Query is strictly after the last timestamp
    After,
}

impl Bracket {
    /// Returns true when the query is inside the sampled range.
    pub fn is_within(&self) -> bool {
        matches!(self, Bracket::Exact(_) | Bracket::Between { .. })
    }
}

/// Index of the rightmost timestamp `<= query`, or `None` if every
/// timestamp is greater than the query.
pub fn rightmost_at_or_before(timestamps: &[f64], query: f64) -> Option<usize> {
    timestamps.partition_point(|&t| t <= query).checked_sub(1)
}

/// Index of the timestamp closest to `query`.
///
/// When two candidates are exactly equidistant the earlier index wins.
/// Returns `None` only for an empty sequence.
pub fn nearest_index(timestamps: &[f64], query: f64) -> Option<usize> {
    if timestamps.is_empty() {
        return None;
    }

    // First index whose timestamp is >= query
    let idx = timestamps.partition_point(|&t| t < query);
    if idx == 0 {
        return Some(0);
    }
    if idx == timestamps.len() {
        return Some(idx - 1);
    }

    let dist_pre = (query - timestamps[idx - 1]).abs();
    let dist_post = (timestamps[idx] - query).abs();
    if dist_pre <= dist_post {
        // Walk back over duplicates so the earliest equal timestamp is chosen
        let t_pre = timestamps[idx - 1];
        Some(timestamps[..idx].partition_point(|&t| t < t_pre))
    } else {
        Some(idx)
    }
}

/// Locate the bracketing pair for `query`.
pub fn bracket(timestamps: &[f64], query: f64) -> Bracket {
    let len = timestamps.len();
    if len == 0 {
        return Bracket::Empty;
    }

    let pre = match rightmost_at_or_before(timestamps, query) {
        Some(pre) => pre,
        None => return Bracket::Before,
    };

    let t_pre = timestamps[pre];
    if t_pre == query {
        return Bracket::Exact(pre);
    }
    if pre + 1 >= len {
        return Bracket::After;
    }

    let post = pre + 1;
    let t_post = timestamps[post];
    Bracket::Between {
        pre,
        post,
        fraction: (query - t_pre) / (t_post - t_pre),
    }
}

/// Index range of the timestamps inside the closed interval `[start, stop]`.
///
/// An inverted interval yields an empty range.
pub fn window_range(timestamps: &[f64], start: f64, stop: f64) -> Range<usize> {
    let lo = timestamps.partition_point(|&t| t < start);
    let hi = timestamps.partition_point(|&t| t <= stop);
    lo..hi.max(lo)
}
