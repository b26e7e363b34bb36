//! Static (single-frame) gesture classification.
//!
//! Order of precedence for one hand on one frame: an active pinch wins,
//! then point, open and grab, which are mutually exclusive by their finger
//! patterns. A frame matching none of them yields no candidate.

use crate::core::fingers::{finger_states, FingerConfig};
use crate::core::geometry::{distance_3d, vector_between, Vec3};
use crate::core::gesture::{Direction, Gesture, DEFAULT_CONFIDENCE};
use crate::source::types::HandLandmarks;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pinch hysteresis thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinchConfig {
    /// Thumb-index distance below which a pinch starts
    pub threshold: f64,
    /// Extra distance above `threshold` required to release
    pub release_margin: f64,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.05,
            release_margin: 0.02,
        }
    }
}

/// Thresholds for resolving a pointing direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointConfig {
    /// Minimum |dz| for forward/backward
    pub depth_min: f64,
    /// |dz| must exceed this fraction of both |dx| and |dy|
    pub depth_dominance: f64,
    /// Both |dx| and |dy| must exceed this for a diagonal
    pub diagonal_min: f64,
}

impl Default for PointConfig {
    fn default() -> Self {
        Self {
            depth_min: 0.05,
            depth_dominance: 0.5,
            diagonal_min: 0.03,
        }
    }
}

/// Schmitt-trigger pinch state for one hand.
#[derive(Debug, Clone, Default)]
pub struct PinchTracker {
    is_pinching: bool,
    last_distance: f64,
    start_time: Option<DateTime<Utc>>,
}

impl PinchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current thumb-index distance. Returns whether a pinch is active.
    pub fn update(&mut self, distance: f64, now: DateTime<Utc>, config: &PinchConfig) -> bool {
        if !self.is_pinching && distance < config.threshold {
            self.is_pinching = true;
            self.start_time = Some(now);
        } else if self.is_pinching && distance > config.threshold + config.release_margin {
            self.is_pinching = false;
            self.start_time = None;
        }
        self.last_distance = distance;
        self.is_pinching
    }

    pub fn is_pinching(&self) -> bool {
        self.is_pinching
    }

    pub fn last_distance(&self) -> f64 {
        self.last_distance
    }

    /// 1 at touching fingertips, falling to 0 at the threshold.
    pub fn strength(&self, config: &PinchConfig) -> f64 {
        (1.0 - self.last_distance / config.threshold).max(0.0)
    }

    /// Milliseconds since the current pinch started, 0 when not pinching.
    pub fn held_ms(&self, now: DateTime<Utc>) -> i64 {
        self.start_time
            .map(|start| (now - start).num_milliseconds())
            .unwrap_or(0)
    }
}

/// Pick one of ten directions for a wrist-to-index-tip vector.
pub fn resolve_point_direction(v: Vec3, config: &PointConfig) -> Direction {
    let (ax, ay, az) = (v.x.abs(), v.y.abs(), v.z.abs());

    if az > config.depth_min
        && az > config.depth_dominance * ax
        && az > config.depth_dominance * ay
    {
        return if v.z < 0.0 {
            Direction::Forward
        } else {
            Direction::Backward
        };
    }

    if ax > config.diagonal_min && ay > config.diagonal_min {
        return match (v.x > 0.0, v.y > 0.0) {
            (true, false) => Direction::TopRight,
            (false, false) => Direction::TopLeft,
            (true, true) => Direction::BottomRight,
            (false, true) => Direction::BottomLeft,
        };
    }

    if ax > ay {
        if v.x > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if v.y > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

/// Classify point/open/grab from a single pose, ignoring pinch.
pub fn classify_pose(
    hand: &HandLandmarks,
    fingers: &FingerConfig,
    point: &PointConfig,
    confidence: f64,
) -> Option<Gesture> {
    let states = finger_states(hand, fingers);

    if states.is_pointing() {
        let vector = vector_between(hand.wrist(), hand.index_tip());
        let direction = resolve_point_direction(vector, point);
        return Some(Gesture::point(direction, vector, confidence));
    }
    if states.all_extended() {
        return Some(Gesture::open(confidence));
    }
    if states.all_curled() {
        return Some(Gesture::grab(confidence));
    }
    None
}

/// Settings for the static classifier as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticConfig {
    pub fingers: FingerConfig,
    pub pinch: PinchConfig,
    pub point: PointConfig,
    pub confidence: f64,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            fingers: FingerConfig::default(),
            pinch: PinchConfig::default(),
            point: PointConfig::default(),
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

/// Classify one frame for one hand, updating its pinch state.
pub fn classify_static(
    hand: &HandLandmarks,
    pinch: &mut PinchTracker,
    now: DateTime<Utc>,
    config: &StaticConfig,
) -> Option<Gesture> {
    let distance = distance_3d(hand.thumb_tip(), hand.index_tip());
    if pinch.update(distance, now, &config.pinch) {
        return Some(Gesture::pinch(
            pinch.strength(&config.pinch),
            pinch.held_ms(now),
            config.confidence,
        ));
    }

    classify_pose(hand, &config.fingers, &config.point, config.confidence)
}
