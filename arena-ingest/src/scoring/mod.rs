//! Incremental scoring
//!
//! Per-(contestant, challenge) state machines that turn metric samples into
//! score updates. Counter challenges add deltas to the persisted score;
//! `longest-upkeep` writes its running maximum as an absolute score.

pub mod challenge;
pub mod engine;
pub mod rules;
pub mod state;

pub use challenge::Challenge;
pub use engine::{ScoreUpdate, ScoringEngine};
pub use state::{MemoryStateStore, ScoringState, SqliteStateStore, StateKey, StateStore};
