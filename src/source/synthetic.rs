//! Synthetic landmark source.
//!
//! Builds geometrically plausible hands for a handful of poses and plays a
//! looping demo script (open palm, wave, point, grab, pinch, swipe) so the
//! engine can be exercised without a camera or a tracking model.

use crate::core::geometry::Vec3;
use crate::source::types::{HandFrame, HandIdentity, Handedness, Landmark, LANDMARK_COUNT};
use crate::source::{FrameSource, SourceError};
use chrono::Utc;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Static hand shapes the generator can produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandPose {
    /// All fingers extended
    Open,
    /// Index extended, the rest curled
    Point,
    /// Fist
    Grab,
    /// Open hand with the thumb tip `gap` away from the index tip
    Pinch { gap: f64 },
}

/// Horizontal offset of each finger column from the wrist (index..pinky).
const FINGER_COLUMNS: [f64; 4] = [-0.02, 0.0, 0.02, 0.04];

/// Joint heights above the wrist for an extended finger (MCP, PIP, DIP, tip).
const EXTENDED: [(f64, f64); 4] = [(-0.10, 0.0), (-0.14, 0.0), (-0.17, 0.0), (-0.20, 0.0)];

/// Curled finger: the PIP rises, then DIP and tip fold back toward the palm.
const CURLED: [(f64, f64); 4] = [(-0.10, 0.0), (-0.13, 0.0), (-0.10, -0.02), (-0.06, -0.02)];

/// Build the 21 landmarks of a right hand in `pose` with the wrist at (`x`, `y`).
pub fn pose_points(pose: HandPose, x: f64, y: f64) -> Vec<Landmark> {
    let mut points = vec![Vec3::ZERO; LANDMARK_COUNT];
    points[0] = Vec3::new(x, y, 0.0);

    let extended = match pose {
        HandPose::Open | HandPose::Pinch { .. } => [true; 4],
        HandPose::Point => [true, false, false, false],
        HandPose::Grab => [false; 4],
    };

    for (finger, column) in FINGER_COLUMNS.iter().enumerate() {
        let joints = if extended[finger] { EXTENDED } else { CURLED };
        for (joint, (dy, dz)) in joints.iter().enumerate() {
            points[5 + finger * 4 + joint] = Vec3::new(x + column, y + dy, *dz);
        }
    }

    let thumb = [(-0.04, -0.03), (-0.07, -0.06), (-0.09, -0.09), (-0.11, -0.11)];
    for (joint, (dx, dy)) in thumb.iter().enumerate() {
        points[1 + joint] = Vec3::new(x + dx, y + dy, 0.0);
    }

    if let HandPose::Pinch { gap } = pose {
        let index_tip = points[8];
        points[3] = Vec3::new(index_tip.x - gap - 0.03, index_tip.y + 0.03, 0.0);
        points[4] = Vec3::new(index_tip.x - gap, index_tip.y, 0.0);
    }

    points
}

/// Mirror a right-hand point set horizontally to produce a left hand.
pub fn mirror(points: &mut [Landmark]) {
    for p in points.iter_mut() {
        p.x = 1.0 - p.x;
    }
}

/// Length of one pass through the demo script, in seconds.
pub const SCRIPT_LENGTH_SECS: f64 = 9.0;

/// Pose and wrist position of the demo script at `elapsed` seconds.
pub fn script_frame(elapsed: f64) -> (HandPose, f64, f64) {
    let t = elapsed.rem_euclid(SCRIPT_LENGTH_SECS);
    let y = 0.7;

    if t < 1.5 {
        (HandPose::Open, 0.5, y)
    } else if t < 3.5 {
        // 2 Hz side-to-side wave
        let phase = (t - 1.5) * 2.0 * std::f64::consts::TAU;
        (HandPose::Open, 0.5 + 0.08 * phase.sin(), y)
    } else if t < 5.0 {
        (HandPose::Point, 0.5, y)
    } else if t < 6.5 {
        (HandPose::Grab, 0.5, y)
    } else if t < 8.0 {
        let closing = ((t - 6.5) / 0.75).min(1.0);
        (HandPose::Pinch { gap: 0.1 * (1.0 - closing) }, 0.5, y)
    } else if t < 8.3 {
        // Swipe right across the frame in 300ms
        (HandPose::Open, 0.3 + (t - 8.0) / 0.3 * 0.4, y)
    } else {
        (HandPose::Open, 0.7, y)
    }
}

/// Configuration for the synthetic source.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Hands to generate every frame
    pub hands: Vec<HandIdentity>,
    /// Frames per second
    pub frame_rate: u32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            hands: vec![HandIdentity::right()],
            frame_rate: 30,
        }
    }
}

/// Plays the demo script on a background thread.
pub struct SyntheticSource {
    config: SyntheticConfig,
    sender: Sender<HandFrame>,
    receiver: Receiver<HandFrame>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        let (sender, receiver) = bounded(1_024);
        Self {
            config,
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

impl FrameSource for SyntheticSource {
    fn start(&mut self) -> Result<(), SourceError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SourceError::AlreadyRunning);
        }
        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let sender = self.sender.clone();
        let hands = self.config.hands.clone();
        let interval = Duration::from_secs_f64(1.0 / self.config.frame_rate.max(1) as f64);

        self.worker = Some(thread::spawn(move || {
            let started = Utc::now();
            while running.load(Ordering::SeqCst) {
                let now = Utc::now();
                let elapsed = (now - started).num_milliseconds() as f64 / 1000.0;
                let (pose, x, y) = script_frame(elapsed);

                for hand in &hands {
                    let mut points = pose_points(pose, x, y);
                    if hand.handedness == Handedness::Left {
                        mirror(&mut points);
                    }
                    match sender.try_send(HandFrame::new(*hand, points, now)) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            tracing::trace!("synthetic frame dropped, consumer is behind");
                        }
                        Err(TrySendError::Disconnected(_)) => return,
                    }
                }

                thread::sleep(interval);
            }
        }));

        tracing::debug!(
            hands = self.config.hands.len(),
            fps = self.config.frame_rate,
            "synthetic source started"
        );
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn receiver(&self) -> &Receiver<HandFrame> {
        &self.receiver
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Validated landmarks for a pose; test fixture shorthand.
#[cfg(test)]
pub(crate) fn pose_landmarks(pose: HandPose, x: f64, y: f64) -> crate::source::types::HandLandmarks {
    crate::source::types::HandLandmarks::try_from(pose_points(pose, x, y).as_slice())
        .expect("synthetic poses are well formed")
}
