//! Per-challenge scoring rules
//!
//! Pure state transitions: no I/O, no clocks. The engine wraps them with
//! state loading, locking and persistence.

use super::challenge::Challenge;
use super::state::ScoringState;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Points credited per additional handled request
pub const POINTS_PER_REQUEST: f64 = 0.1;

/// Upper bound (exclusive) of the filler delta for unrecognized challenges
pub const FILLER_MAX: f64 = 100.0;

/// How a rule's result combines with the persisted score
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Points {
    /// Added to the current persisted score
    Delta(f64),
    /// Replaces the persisted score
    Absolute(f64),
}

impl Points {
    pub fn combine(self, current_score: f64) -> f64 {
        match self {
            Points::Delta(delta) => current_score + delta,
            Points::Absolute(score) => score,
        }
    }
}

/// Apply one observation to `state`
///
/// `state` must be the variant [`ScoringState::initial_for`] gives for
/// `challenge`; the engine guarantees this.
pub fn apply(
    challenge: &Challenge,
    state: &mut ScoringState,
    value: f64,
    timestamp: DateTime<Utc>,
) -> Points {
    match state {
        ScoringState::Counter { last_observed } => Points::Delta(counter_delta(last_observed, value)),
        ScoringState::Upkeep {
            current_up_start_time,
            max_up_duration,
        } => Points::Absolute(observe_upkeep(
            current_up_start_time,
            max_up_duration,
            value,
            epoch_seconds(timestamp),
        )),
        ScoringState::Unscored => {
            debug_assert!(challenge.metric().is_none());
            Points::Delta(filler_delta())
        }
    }
}

/// Request counter rule
///
/// Only increases score. The new value always becomes the baseline, so a
/// counter reset is neither penalized nor credited.
pub fn counter_delta(last_observed: &mut f64, value: f64) -> f64 {
    let increase = value - *last_observed;
    *last_observed = value;

    if increase > 0.0 {
        increase * POINTS_PER_REQUEST
    } else {
        0.0
    }
}

/// Longest uptime rule, returns the running maximum duration in seconds
///
/// A start time later than the recorded one means the process restarted:
/// current tracking resets, the maximum never decreases.
pub fn observe_upkeep(
    current_up_start_time: &mut Option<f64>,
    max_up_duration: &mut f64,
    start_time: f64,
    now_secs: f64,
) -> f64 {
    let start = match *current_up_start_time {
        Some(previous) if start_time <= previous => previous,
        _ => {
            *current_up_start_time = Some(start_time);
            start_time
        }
    };

    let current_up_duration = now_secs - start;
    if current_up_duration > *max_up_duration {
        *max_up_duration = current_up_duration;
    }

    *max_up_duration
}

/// Uniform random delta in `[0, FILLER_MAX)` for challenges without a rule
///
/// Placeholder scoring kept for compatibility; replace here without touching
/// the real challenge rules.
pub fn filler_delta() -> f64 {
    rand::thread_rng().gen_range(0.0..FILLER_MAX)
}

fn epoch_seconds(timestamp: DateTime<Utc>) -> f64 {
    timestamp.timestamp_millis() as f64 / 1000.0
}
