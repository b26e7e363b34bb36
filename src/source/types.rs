//! Landmark frame types consumed by the gesture engine.
//!
//! A frame carries one tracked hand: 21 normalized landmarks in image space
//! (x/y in [0, 1], y growing downward, z more negative toward the camera).

use crate::core::geometry::Vec3;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single tracked hand joint.
pub type Landmark = Vec3;

/// Number of landmarks in a hand set.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Which hand the tracker believes it is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "Left",
            Handedness::Right => "Right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-session key for one tracked hand: handedness plus detection slot.
///
/// Identities are re-derived each session and carry no meaning across
/// tracker restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandIdentity {
    pub handedness: Handedness,
    pub slot: u8,
}

impl HandIdentity {
    pub fn new(handedness: Handedness, slot: u8) -> Self {
        Self { handedness, slot }
    }

    pub fn left() -> Self {
        Self::new(Handedness::Left, 0)
    }

    pub fn right() -> Self {
        Self::new(Handedness::Right, 0)
    }
}

impl fmt::Display for HandIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.handedness, self.slot)
    }
}

/// Data-shape violations that cause a frame to be skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("expected {expected} landmarks, got {actual}")]
    WrongLandmarkCount { expected: usize, actual: usize },
    #[error("landmark {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
}

/// A validated set of exactly 21 finite landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks([Landmark; LANDMARK_COUNT]);

impl HandLandmarks {
    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.0
    }

    pub fn wrist(&self) -> Landmark {
        self.0[WRIST]
    }

    pub fn thumb_tip(&self) -> Landmark {
        self.0[THUMB_TIP]
    }

    pub fn index_tip(&self) -> Landmark {
        self.0[INDEX_TIP]
    }
}

impl std::ops::Index<usize> for HandLandmarks {
    type Output = Landmark;

    fn index(&self, index: usize) -> &Landmark {
        &self.0[index]
    }
}

impl TryFrom<&[Landmark]> for HandLandmarks {
    type Error = FrameError;

    fn try_from(points: &[Landmark]) -> Result<Self, Self::Error> {
        let array: [Landmark; LANDMARK_COUNT] =
            points
                .try_into()
                .map_err(|_| FrameError::WrongLandmarkCount {
                    expected: LANDMARK_COUNT,
                    actual: points.len(),
                })?;

        if let Some(index) = array.iter().position(|p| !p.is_finite()) {
            return Err(FrameError::NonFiniteCoordinate { index });
        }

        Ok(Self(array))
    }
}

/// One tracked hand in one camera frame, as delivered by a landmark source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    pub hand: HandIdentity,
    pub landmarks: Vec<Landmark>,
    pub timestamp: DateTime<Utc>,
}

impl HandFrame {
    pub fn new(hand: HandIdentity, landmarks: Vec<Landmark>, timestamp: DateTime<Utc>) -> Self {
        Self {
            hand,
            landmarks,
            timestamp,
        }
    }

    /// Check the frame's shape and return its landmarks as a fixed set.
    pub fn validate(&self) -> Result<HandLandmarks, FrameError> {
        HandLandmarks::try_from(self.landmarks.as_slice())
    }
}
