//! Core gesture classification.
//!
//! This module contains:
//! - Geometry helpers and the finger extension classifier
//! - The static pose classifier (point, open, grab, pinch)
//! - Wave and swipe detectors over wrist motion history
//! - Debounce/dispatch and the per-hand engine that ties them together

pub mod classifier;
pub mod dispatch;
pub mod engine;
pub mod fingers;
pub mod geometry;
pub mod gesture;
pub mod swipe;
pub mod wave;

// Re-export commonly used types
pub use classifier::{classify_pose, classify_static, resolve_point_direction, PinchTracker};
pub use dispatch::{Debouncer, ListenerId, ListenerRegistry};
pub use engine::{EngineConfig, GestureEngine};
pub use fingers::{finger_states, is_finger_extended, Finger, FingerStates};
pub use geometry::Vec3;
pub use gesture::{Direction, Gesture, GestureKind, GestureNotification};
pub use swipe::SwipeDetector;
pub use wave::WaveDetector;
