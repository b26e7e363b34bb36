//! Session statistics for the gesture engine.
//!
//! This module tracks what a run processed and produced, for display at the
//! end of a session and over the HTTP interface.

pub mod session;

// Re-export commonly used types
pub use session::{create_shared_stats, SessionStats, SharedSessionStats, StatsSnapshot};
