//! Per-finger extended/curled decision from landmark geometry.
//!
//! Three signals are computed for each finger:
//!
//! 1. **Distance ratio**: tip-to-wrist over MCP-to-wrist distance.
//! 2. **Straightness**: dot products of consecutive bone directions
//!    (wrist→MCP vs MCP→PIP, MCP→PIP vs PIP→DIP).
//! 3. **Separation** (index only): how far the index tip sits from the
//!    middle tip, relative to the index MCP.
//!
//! The index finger is extended if *any* signal fires; the other fingers
//! need both the ratio and the straightness test.

use crate::core::geometry::{distance_3d, dot, normalize, vector_between};
use crate::source::types::{HandLandmarks, MIDDLE_TIP, WRIST};
use serde::{Deserialize, Serialize};

/// The four non-thumb fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    /// Landmark indices of the MCP, PIP, DIP and tip joints.
    pub fn joints(&self) -> [usize; 4] {
        let base = match self {
            Finger::Index => 5,
            Finger::Middle => 9,
            Finger::Ring => 13,
            Finger::Pinky => 17,
        };
        [base, base + 1, base + 2, base + 3]
    }
}

/// Thresholds for the finger extension test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerConfig {
    /// Minimum tip/base distance ratio for the index finger
    pub index_ratio: f64,
    /// Minimum tip/base distance ratio for the other fingers
    pub other_ratio: f64,
    /// Minimum bone-direction dot product for the index finger
    pub index_straightness: f64,
    /// Minimum bone-direction dot product for the other fingers
    pub other_straightness: f64,
    /// Index tip must be this fraction of the MCP-to-middle-tip distance away
    /// from the middle tip to count as separated
    pub separation_factor: f64,
}

impl Default for FingerConfig {
    fn default() -> Self {
        Self {
            index_ratio: 1.1,
            other_ratio: 1.2,
            index_straightness: 0.5,
            other_straightness: 0.7,
            separation_factor: 0.7,
        }
    }
}

/// Extension flags for the four non-thumb fingers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerStates {
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    pub fn all_extended(&self) -> bool {
        self.index && self.middle && self.ring && self.pinky
    }

    pub fn all_curled(&self) -> bool {
        !self.index && !self.middle && !self.ring && !self.pinky
    }

    /// Index out, the rest curled.
    pub fn is_pointing(&self) -> bool {
        self.index && !self.middle && !self.ring && !self.pinky
    }
}

/// Compute extension flags for every non-thumb finger.
pub fn finger_states(hand: &HandLandmarks, config: &FingerConfig) -> FingerStates {
    FingerStates {
        index: is_finger_extended(hand, Finger::Index, config),
        middle: is_finger_extended(hand, Finger::Middle, config),
        ring: is_finger_extended(hand, Finger::Ring, config),
        pinky: is_finger_extended(hand, Finger::Pinky, config),
    }
}

/// Decide whether a single finger is extended.
pub fn is_finger_extended(hand: &HandLandmarks, finger: Finger, config: &FingerConfig) -> bool {
    let [mcp, pip, dip, tip] = finger.joints();
    let wrist = hand[WRIST];

    let base_dist = distance_3d(wrist, hand[mcp]);
    let tip_dist = distance_3d(wrist, hand[tip]);
    let ratio = if base_dist > 0.0 {
        tip_dist / base_dist
    } else {
        0.0
    };

    let palm_dir = normalize(vector_between(wrist, hand[mcp]));
    let proximal_dir = normalize(vector_between(hand[mcp], hand[pip]));
    let middle_dir = normalize(vector_between(hand[pip], hand[dip]));
    let base_bend = dot(palm_dir, proximal_dir);
    let mid_bend = dot(proximal_dir, middle_dir);

    match finger {
        Finger::Index => {
            let by_ratio = ratio > config.index_ratio;
            let straight =
                base_bend > config.index_straightness && mid_bend > config.index_straightness;
            let tip_gap = distance_3d(hand[tip], hand[MIDDLE_TIP]);
            let base_gap = distance_3d(hand[mcp], hand[MIDDLE_TIP]);
            let separated = tip_gap > config.separation_factor * base_gap;
            by_ratio || straight || separated
        }
        _ => {
            let by_ratio = ratio > config.other_ratio;
            let straight =
                base_bend > config.other_straightness && mid_bend > config.other_straightness;
            by_ratio && straight
        }
    }
}
