//! HandPlay gesture engine - hand gesture recognition for toddler play.
//!
//! This library turns per-frame hand landmarks (21 points per hand, as
//! produced by common hand-tracking models) into a small vocabulary of
//! gestures a young child can perform: point, open palm, grab, pinch, wave
//! and swipe.
//!
//! # Guarantees
//!
//! - **Per-hand isolation**: every tracked hand has its own detector state
//! - **No panics on bad input**: malformed frames are rejected with an error
//! - **No persistence**: landmarks and hand state live only for the session
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   HandPlay Gesture Engine                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Source    │──▶│   Static    │──▶│  Debounce   │──▶ listeners
//! │  │ (frames)    │   │ classifier  │   │ + dispatch  │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         │          ┌─────────────┐          ▲              │
//! │         └─────────▶│ Wave/Swipe  │──────────┘              │
//! │                    │  detectors  │                         │
//! │                    └─────────────┘                         │
//! │  ┌─────────────┐                                           │
//! │  │  Session    │                                           │
//! │  │  stats      │                                           │
//! │  └─────────────┘                                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use handplay_gesture_engine::{core::GestureEngine, source, EngineConfig};
//! use source::FrameSource;
//!
//! let mut engine = GestureEngine::new(EngineConfig::default());
//! engine.subscribe(|n: &handplay_gesture_engine::GestureNotification| {
//!     println!("{} {}", n.hand, n.gesture.kind);
//! });
//!
//! let mut source = source::SyntheticSource::new(source::SyntheticConfig::default());
//! source.start().expect("synthetic source starts");
//!
//! for frame in source.receiver().iter().take(300) {
//!     let _ = engine.process_frame(&frame);
//! }
//! ```

pub mod config;
pub mod core;
pub mod source;
pub mod stats;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, HandFilter};
pub use core::{
    Direction, EngineConfig, Gesture, GestureEngine, GestureKind, GestureNotification,
};
pub use source::{
    FrameError, FrameSource, HandFrame, HandIdentity, HandLandmarks, Handedness, Landmark,
    ReplaySource, SyntheticSource,
};
pub use stats::{SessionStats, SharedSessionStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Guide to the supported gestures, for display to parents and testers.
pub const GESTURE_GUIDE: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║              HANDPLAY - GESTURES THE APP UNDERSTANDS             ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  ✋ OPEN     All four fingers stretched out                       ║
║  ☝ POINT    Only the index finger out; direction is reported     ║
║              (up, down, left, right, diagonals, toward/away)     ║
║  ✊ GRAB     All four fingers curled into a fist                  ║
║  🤏 PINCH    Thumb tip touching index tip; strength grows as     ║
║              they close, and the hold time is reported           ║
║  👋 WAVE     Hand moving side to side, two turns within 2s       ║
║  👉 SWIPE    A quick sweep across the view (left/right/up/down)  ║
║                                                                  ║
║  Each hand is tracked on its own. Nothing is stored after the    ║
║  session ends.                                                   ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_guide_lists_every_gesture() {
        let guide = GESTURE_GUIDE.to_lowercase();
        for kind in GestureKind::ALL {
            assert!(guide.contains(kind.as_str()), "missing {kind}");
        }
    }
}
