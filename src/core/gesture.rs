//! Gesture candidates and the notifications handed to subscribers.

use crate::core::geometry::Vec3;
use crate::source::types::{HandIdentity, HandLandmarks, Handedness};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Heuristic confidence attached to every candidate. Not a calibrated probability.
pub const DEFAULT_CONFIDENCE: f64 = 0.9;

/// Recognized gesture types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    /// Index finger extended, others curled.
    Point,
    /// All four fingers extended.
    Open,
    /// All four fingers curled (fist).
    Grab,
    /// Thumb and index fingertips together.
    Pinch,
    /// Side-to-side wrist oscillation.
    Wave,
    /// Fast wrist movement in one direction.
    Swipe,
}

impl GestureKind {
    pub const ALL: [GestureKind; 6] = [
        GestureKind::Point,
        GestureKind::Open,
        GestureKind::Grab,
        GestureKind::Pinch,
        GestureKind::Wave,
        GestureKind::Swipe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Open => "open",
            Self::Grab => "grab",
            Self::Pinch => "pinch",
            Self::Wave => "wave",
            Self::Swipe => "swipe",
        }
    }

    /// Whether the gesture is derived from motion history rather than a single pose.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Wave | Self::Swipe)
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointing direction (10 symbols) or swipe direction (the four cardinals).
///
/// Up/down follow image space: y grows downward, so "bottom" means larger y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Forward,
    Backward,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified gesture candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    #[serde(rename = "name")]
    pub kind: GestureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Pinch closeness, 0..=1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    /// Swipe speed in normalized units per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// How long the pinch has been held, in milliseconds
    #[serde(rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    pub confidence: f64,
    /// Wrist-to-index-tip vector for point gestures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec3>,
}

impl Gesture {
    fn bare(kind: GestureKind, confidence: f64) -> Self {
        Self {
            kind,
            direction: None,
            strength: None,
            speed: None,
            duration_ms: None,
            confidence,
            vector: None,
        }
    }

    pub fn point(direction: Direction, vector: Vec3, confidence: f64) -> Self {
        Self {
            direction: Some(direction),
            vector: Some(vector),
            ..Self::bare(GestureKind::Point, confidence)
        }
    }

    pub fn open(confidence: f64) -> Self {
        Self::bare(GestureKind::Open, confidence)
    }

    pub fn grab(confidence: f64) -> Self {
        Self::bare(GestureKind::Grab, confidence)
    }

    pub fn pinch(strength: f64, duration_ms: i64, confidence: f64) -> Self {
        Self {
            strength: Some(strength),
            duration_ms: Some(duration_ms),
            ..Self::bare(GestureKind::Pinch, confidence)
        }
    }

    pub fn wave(confidence: f64) -> Self {
        Self::bare(GestureKind::Wave, confidence)
    }

    pub fn swipe(direction: Direction, speed: f64, confidence: f64) -> Self {
        Self {
            direction: Some(direction),
            speed: Some(speed),
            ..Self::bare(GestureKind::Swipe, confidence)
        }
    }
}

/// A gesture that survived dispatch, as delivered to listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureNotification {
    pub gesture: Gesture,
    pub hand: HandIdentity,
    pub handedness: Handedness,
    /// The pose the gesture was read from; `None` for wave and swipe.
    pub landmarks: Option<HandLandmarks>,
    pub timestamp: DateTime<Utc>,
}
