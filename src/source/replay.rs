//! Replay of a recorded landmark stream.
//!
//! Input is JSON Lines, one [`HandFrame`] per line. Blank lines are skipped.

use crate::source::types::HandFrame;
use crate::source::{FrameSource, SourceError};
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// Longest pause honoured between two frames when pacing a replay.
const MAX_REPLAY_GAP: Duration = Duration::from_secs(1);

/// How often a blocked worker rechecks the running flag.
const SEND_POLL: Duration = Duration::from_millis(50);

/// Errors while loading a recording.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a JSON Lines recording.
pub fn parse_frames(content: &str) -> Result<Vec<HandFrame>, ReplayError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| {
            serde_json::from_str(l).map_err(|source| ReplayError::Parse { line: i + 1, source })
        })
        .collect()
}

/// Streams a recording into a channel on a background thread.
pub struct ReplaySource {
    frames: Arc<Vec<HandFrame>>,
    realtime: bool,
    sender: Option<Sender<HandFrame>>,
    receiver: Receiver<HandFrame>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ReplaySource {
    /// Load a recording from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_frames(parse_frames(&content)?))
    }

    pub fn from_frames(frames: Vec<HandFrame>) -> Self {
        let (sender, receiver) = bounded(1_024);
        Self {
            frames: Arc::new(frames),
            realtime: false,
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Sleep between frames according to their recorded timestamps.
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ReplaySource {
    fn start(&mut self) -> Result<(), SourceError> {
        // The sender moves into the worker so the channel closes when it finishes.
        let sender = self.sender.take().ok_or(SourceError::AlreadyRunning)?;
        self.running.store(true, Ordering::SeqCst);

        let frames = self.frames.clone();
        let running = self.running.clone();
        let realtime = self.realtime;

        self.worker = Some(thread::spawn(move || {
            let mut previous: Option<DateTime<Utc>> = None;
            'frames: for frame in frames.iter() {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                if realtime {
                    if let Some(prev) = previous {
                        if let Ok(gap) = (frame.timestamp - prev).to_std() {
                            thread::sleep(gap.min(MAX_REPLAY_GAP));
                        }
                    }
                    previous = Some(frame.timestamp);
                }
                let mut pending = frame.clone();
                loop {
                    match sender.send_timeout(pending, SEND_POLL) {
                        Ok(()) => break,
                        Err(SendTimeoutError::Timeout(frame)) => {
                            // Consumer is behind; give up if we were asked to stop.
                            if !running.load(Ordering::SeqCst) {
                                break 'frames;
                            }
                            pending = frame;
                        }
                        Err(SendTimeoutError::Disconnected(_)) => break 'frames,
                    }
                }
            }
            running.store(false, Ordering::SeqCst);
        }));

        tracing::debug!(frames = self.frames.len(), "replay started");
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::synthetic::{pose_points, HandPose};
    use crate::source::types::HandIdentity;
    use chrono::Utc;
    use std::io::Write;

    fn recording(n: usize) -> String {
        (0..n)
            .map(|_| {
                let frame = HandFrame::new(
                    HandIdentity::right(),
                    pose_points(HandPose::Open, 0.5, 0.7),
                    Utc::now(),
                );
                serde_json::to_string(&frame).unwrap()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let content = format!("{}\n\n", recording(3));
        assert_eq!(parse_frames(&content).unwrap().len(), 3);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let content = format!("{}\nnot json\n", recording(2));
        match parse_frames(&content) {
            Err(ReplayError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_replay_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", recording(4)).unwrap();

        let mut source = ReplaySource::open(file.path()).unwrap();
        assert_eq!(source.frame_count(), 4);
        source.start().unwrap();

        let received: Vec<HandFrame> = source.receiver().iter().collect();
        assert_eq!(received.len(), 4);
        assert!(matches!(source.start(), Err(SourceError::AlreadyRunning)));
        source.stop();
    }

    #[test]
    fn test_realtime_replay_paces_frames() {
        let t0 = Utc::now();
        let frames: Vec<HandFrame> = (0..3)
            .map(|i| {
                HandFrame::new(
                    HandIdentity::right(),
                    pose_points(HandPose::Open, 0.5, 0.7),
                    t0 + chrono::Duration::milliseconds(i * 40),
                )
            })
            .collect();

        let mut source = ReplaySource::from_frames(frames).realtime(true);
        let started = std::time::Instant::now();
        source.start().unwrap();
        let received: Vec<HandFrame> = source.receiver().iter().collect();

        assert_eq!(received.len(), 3);
        assert!(started.elapsed() >= Duration::from_millis(80));
    }

    #[test]
    fn test_stop_with_unread_backlog() {
        let frames: Vec<HandFrame> = (0..2_000)
            .map(|_| {
                HandFrame::new(
                    HandIdentity::right(),
                    pose_points(HandPose::Open, 0.5, 0.7),
                    Utc::now(),
                )
            })
            .collect();

        let mut source = ReplaySource::from_frames(frames);
        source.start().unwrap();
        source
            .receiver()
            .recv_timeout(Duration::from_secs(2))
            .expect("first frame");

        // The worker is blocked on a full channel; stop must still return.
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        thread::spawn(move || {
            source.stop();
            let _ = done_tx.send(());
        });
        assert!(done_rx.recv_timeout(Duration::from_secs(3)).is_ok());
    }
}
