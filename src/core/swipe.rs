//! Swipe detection from wrist motion history.

use crate::config::{chrono_duration, duration_ms};
use crate::core::gesture::Direction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Swipe detector thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeConfig {
    /// Look-back window for wrist samples
    #[serde(with = "duration_ms")]
    pub history: std::time::Duration,
    /// Minimum time between two swipes on the same hand
    #[serde(with = "duration_ms")]
    pub refractory: std::time::Duration,
    /// Samples needed before a swipe can be read
    pub min_samples: usize,
    /// Minimum displacement along either axis
    pub min_distance: f64,
    /// Minimum velocity along either axis, units per second
    pub min_velocity: f64,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            history: std::time::Duration::from_millis(500),
            refractory: std::time::Duration::from_millis(1000),
            min_samples: 5,
            min_distance: 0.15,
            min_velocity: 0.5,
        }
    }
}

/// A detected swipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swipe {
    pub direction: Direction,
    pub speed: f64,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    x: f64,
    y: f64,
    t: DateTime<Utc>,
}

/// Per-hand swipe state.
#[derive(Debug, Clone, Default)]
pub struct SwipeDetector {
    positions: VecDeque<Sample>,
    last_detection: Option<DateTime<Utc>>,
}

impl SwipeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the wrist position. Returns a swipe when one completes.
    pub fn update(
        &mut self,
        x: f64,
        y: f64,
        now: DateTime<Utc>,
        config: &SwipeConfig,
    ) -> Option<Swipe> {
        if let Some(last) = self.last_detection {
            if now - last < chrono_duration(config.refractory) {
                return None;
            }
        }

        self.positions.push_back(Sample { x, y, t: now });
        let history = chrono_duration(config.history);
        while let Some(oldest) = self.positions.front() {
            if now - oldest.t > history {
                self.positions.pop_front();
            } else {
                break;
            }
        }

        if self.positions.len() < config.min_samples {
            return None;
        }

        let (first, last) = match (self.positions.front(), self.positions.back()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return None,
        };
        let elapsed = (last.t - first.t).num_milliseconds() as f64 / 1000.0;
        if elapsed <= 0.0 {
            return None;
        }

        let dx = last.x - first.x;
        let dy = last.y - first.y;
        let vx = dx / elapsed;
        let vy = dy / elapsed;

        let far_enough = dx.abs() > config.min_distance || dy.abs() > config.min_distance;
        let fast_enough = vx.abs() > config.min_velocity || vy.abs() > config.min_velocity;
        if !(far_enough && fast_enough) {
            return None;
        }

        let direction = if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        };

        self.positions.clear();
        self.last_detection = Some(now);
        Some(Swipe {
            direction,
            speed: (vx * vx + vy * vy).sqrt(),
        })
    }

    pub fn sample_count(&self) -> usize {
        self.positions.len()
    }
}
