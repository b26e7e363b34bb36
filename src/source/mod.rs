//! Landmark sources feeding the gesture engine.
//!
//! The engine itself never talks to a camera or a tracking model. Sources
//! deliver [`HandFrame`]s over a channel; two are provided here, a synthetic
//! generator for demos and tests, and a JSON Lines replay of a recorded stream.

pub mod replay;
pub mod synthetic;
pub mod types;

use crossbeam_channel::Receiver;
use thiserror::Error;

// Re-export commonly used types
pub use replay::{ReplayError, ReplaySource};
pub use synthetic::{pose_points, HandPose, SyntheticConfig, SyntheticSource};
pub use types::{FrameError, HandFrame, HandIdentity, HandLandmarks, Handedness, Landmark};

/// Errors from starting a source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source is already running")]
    AlreadyRunning,
}

/// A producer of hand frames.
pub trait FrameSource {
    /// Begin delivering frames on [`FrameSource::receiver`].
    fn start(&mut self) -> Result<(), SourceError>;

    /// Stop delivering frames.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Channel the frames arrive on. Disconnects once a finite source is exhausted.
    fn receiver(&self) -> &Receiver<HandFrame>;
}
