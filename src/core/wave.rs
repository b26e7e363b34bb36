//! Wave detection from wrist motion history.
//!
//! A wave is two horizontal direction reversals of the wrist inside a short
//! window. Direction is read between the newest sample and the one two
//! positions back, which smooths out single-frame jitter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::config::{chrono_duration, duration_ms};

/// Wave detector thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Look-back window for wrist samples
    #[serde(with = "duration_ms")]
    pub history: std::time::Duration,
    /// Reversals must happen within this long of the window start
    #[serde(with = "duration_ms")]
    pub window: std::time::Duration,
    /// A window open this long without a wave is discarded
    #[serde(with = "duration_ms")]
    pub stale_after: std::time::Duration,
    /// Quiet period after a detection
    #[serde(with = "duration_ms")]
    pub cooldown: std::time::Duration,
    /// Minimum horizontal travel to register a direction
    pub min_delta_x: f64,
    /// Reversals needed for a wave
    pub reversals: u32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            history: std::time::Duration::from_millis(2000),
            window: std::time::Duration::from_millis(2000),
            stale_after: std::time::Duration::from_millis(3000),
            cooldown: std::time::Duration::from_millis(1000),
            min_delta_x: 0.03,
            reversals: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Horizontal {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    x: f64,
    t: DateTime<Utc>,
}

/// Per-hand wave state.
#[derive(Debug, Clone)]
pub struct WaveDetector {
    positions: VecDeque<Sample>,
    direction_changes: u32,
    window_start: DateTime<Utc>,
    last_direction: Option<Horizontal>,
}

impl WaveDetector {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            positions: VecDeque::new(),
            direction_changes: 0,
            window_start: now,
            last_direction: None,
        }
    }

    /// Feed the wrist x position. Returns true when a wave completes.
    pub fn update(&mut self, x: f64, now: DateTime<Utc>, config: &WaveConfig) -> bool {
        self.positions.push_back(Sample { x, t: now });
        let history = chrono_duration(config.history);
        while let Some(oldest) = self.positions.front() {
            if now - oldest.t > history {
                self.positions.pop_front();
            } else {
                break;
            }
        }

        if self.positions.len() < 3 {
            return false;
        }

        if now - self.window_start > chrono_duration(config.stale_after) {
            self.direction_changes = 0;
            self.window_start = now;
            self.last_direction = None;
        }

        let latest = self.positions[self.positions.len() - 1];
        let earlier = self.positions[self.positions.len() - 3];
        let delta_x = latest.x - earlier.x;
        if delta_x.abs() < config.min_delta_x {
            return false;
        }

        let direction = if delta_x > 0.0 {
            Horizontal::Right
        } else {
            Horizontal::Left
        };
        let cooling_down = now < self.window_start;
        if let Some(last) = self.last_direction {
            if last != direction && !cooling_down {
                self.direction_changes += 1;
            }
        }
        self.last_direction = Some(direction);

        if self.direction_changes >= config.reversals
            && now - self.window_start <= chrono_duration(config.window)
        {
            self.direction_changes = 0;
            self.window_start = now
                .checked_add_signed(chrono_duration(config.cooldown))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            return true;
        }
        false
    }

    pub fn sample_count(&self) -> usize {
        self.positions.len()
    }

    pub fn direction_changes(&self) -> u32 {
        self.direction_changes
    }
}
