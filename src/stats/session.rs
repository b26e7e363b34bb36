//! Session statistics for the gesture engine.
//!
//! Counts what the engine saw and produced during one run. Nothing here is
//! persisted; stats die with the session.

use crate::core::gesture::GestureKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Number of recent inter-frame intervals kept for timing statistics.
const INTERVAL_HISTORY: usize = 1024;

/// Counters for one engine session.
#[derive(Debug)]
pub struct SessionStats {
    /// Frames that passed validation
    frames_processed: AtomicU64,
    /// Frames rejected for their shape
    frames_rejected: AtomicU64,
    /// Hands whose state was torn down
    hand_resets: AtomicU64,
    /// Surfaced gestures, indexed like `GestureKind::ALL`
    gestures: [AtomicU64; 6],
    /// Recent per-hand inter-frame intervals in milliseconds
    intervals: Mutex<VecDeque<f64>>,
    /// Session start time
    session_start: DateTime<Utc>,
}

fn slot(kind: GestureKind) -> usize {
    match kind {
        GestureKind::Point => 0,
        GestureKind::Open => 1,
        GestureKind::Grab => 2,
        GestureKind::Pinch => 3,
        GestureKind::Wave => 4,
        GestureKind::Swipe => 5,
    }
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            frames_processed: AtomicU64::new(0),
            frames_rejected: AtomicU64::new(0),
            hand_resets: AtomicU64::new(0),
            gestures: Default::default(),
            intervals: Mutex::new(VecDeque::with_capacity(INTERVAL_HISTORY)),
            session_start: Utc::now(),
        }
    }

    /// Record a processed frame and, if known, the gap since the hand's previous frame.
    pub fn record_frame_processed(&self, interval_ms: Option<f64>) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
        if let Some(interval) = interval_ms {
            let mut intervals = self.intervals.lock().unwrap_or_else(|e| e.into_inner());
            if intervals.len() == INTERVAL_HISTORY {
                intervals.pop_front();
            }
            intervals.push_back(interval);
        }
    }

    pub fn record_frame_rejected(&self) {
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hand_reset(&self) {
        self.hand_resets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_gesture(&self, kind: GestureKind) {
        self.gestures[slot(kind)].fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        let intervals: Vec<f64> = {
            let guard = self.intervals.lock().unwrap_or_else(|e| e.into_inner());
            guard.iter().copied().collect()
        };
        let (mean_interval_ms, interval_std_dev_ms) = if intervals.len() >= 2 {
            (
                Some(intervals.iter().mean()),
                Some(intervals.iter().std_dev()),
            )
        } else {
            (intervals.first().copied(), None)
        };

        let gestures = GestureKind::ALL
            .iter()
            .map(|kind| {
                (
                    kind.as_str().to_string(),
                    self.gestures[slot(*kind)].load(Ordering::Relaxed),
                )
            })
            .collect();

        StatsSnapshot {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
            hand_resets: self.hand_resets.load(Ordering::Relaxed),
            gestures,
            mean_interval_ms,
            interval_std_dev_ms,
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        let gestures = stats
            .gestures
            .iter()
            .map(|(name, count)| format!("   - {name}: {count}"))
            .collect::<Vec<_>>()
            .join("\n");
        let timing = match (stats.mean_interval_ms, stats.interval_std_dev_ms) {
            (Some(mean), Some(sd)) => format!("{mean:.1} ms (sd {sd:.1} ms)"),
            (Some(mean), None) => format!("{mean:.1} ms"),
            _ => "n/a".to_string(),
        };
        format!(
            "Session Statistics:\n\
             - Frames processed: {}\n\
             - Frames rejected: {}\n\
             - Hand resets: {}\n\
             - Mean frame interval: {}\n\
             - Session duration: {} seconds\n\
             - Gestures surfaced:\n{}",
            stats.frames_processed,
            stats.frames_rejected,
            stats.hand_resets,
            timing,
            stats.session_duration_secs,
            gestures
        )
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.frames_processed.store(0, Ordering::Relaxed);
        self.frames_rejected.store(0, Ordering::Relaxed);
        self.hand_resets.store(0, Ordering::Relaxed);
        for counter in &self.gestures {
            counter.store(0, Ordering::Relaxed);
        }
        self.intervals
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of session statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub frames_processed: u64,
    pub frames_rejected: u64,
    pub hand_resets: u64,
    /// Surfaced gestures by name
    pub gestures: BTreeMap<String, u64>,
    pub mean_interval_ms: Option<f64>,
    pub interval_std_dev_ms: Option<f64>,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

impl StatsSnapshot {
    pub fn gesture_count(&self, kind: GestureKind) -> u64 {
        self.gestures.get(kind.as_str()).copied().unwrap_or(0)
    }

    pub fn total_gestures(&self) -> u64 {
        self.gestures.values().sum()
    }
}

/// Thread-safe shared session stats.
pub type SharedSessionStats = Arc<SessionStats>;

/// Create a new shared stats collector.
pub fn create_shared_stats() -> SharedSessionStats {
    Arc::new(SessionStats::new())
}
