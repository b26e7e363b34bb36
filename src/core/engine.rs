//! The gesture engine: per-hand state, classification and dispatch.
//!
//! Each valid frame goes through the static classifier and both motion
//! detectors for its hand. Static candidates are debounced; wave and swipe
//! carry their own cooldowns and are surfaced as detected.

use crate::core::classifier::{classify_static, PinchTracker, StaticConfig};
use crate::core::dispatch::{DebounceConfig, Debouncer, ListenerId, ListenerRegistry};
use crate::core::gesture::{Gesture, GestureNotification};
use crate::core::swipe::{SwipeConfig, SwipeDetector};
use crate::core::wave::{WaveConfig, WaveDetector};
use crate::source::types::{FrameError, HandFrame, HandIdentity, HandLandmarks};
use crate::stats::SharedSessionStats;
use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// All engine thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Finger, pinch and pointing thresholds
    pub pose: StaticConfig,
    pub wave: WaveConfig,
    pub swipe: SwipeConfig,
    pub debounce: DebounceConfig,
}

/// Detector state owned for one tracked hand.
#[derive(Debug, Clone)]
struct HandState {
    pinch: PinchTracker,
    wave: WaveDetector,
    swipe: SwipeDetector,
    debounce: Debouncer,
    last_frame_at: DateTime<Utc>,
}

impl HandState {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            pinch: PinchTracker::new(),
            wave: WaveDetector::new(now),
            swipe: SwipeDetector::new(),
            debounce: Debouncer::new(),
            last_frame_at: now,
        }
    }
}

/// Turns hand frames into gesture notifications.
///
/// The engine is driven synchronously by whoever delivers frames. Frames for
/// a given hand must arrive in non-decreasing timestamp order.
#[derive(Debug, Default)]
pub struct GestureEngine {
    config: EngineConfig,
    hands: HashMap<HandIdentity, HandState>,
    listeners: ListenerRegistry,
    stats: Option<SharedSessionStats>,
}

impl GestureEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            hands: HashMap::new(),
            listeners: ListenerRegistry::new(),
            stats: None,
        }
    }

    /// Report processing counts to a shared stats collector.
    pub fn with_stats(mut self, stats: SharedSessionStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process one frame for one hand.
    ///
    /// Returns the notifications that survived dispatch, after they have been
    /// delivered to listeners. A malformed frame is rejected with an error and
    /// leaves every hand's state untouched.
    pub fn process_frame(
        &mut self,
        frame: &HandFrame,
    ) -> Result<Vec<GestureNotification>, FrameError> {
        let landmarks = match frame.validate() {
            Ok(landmarks) => landmarks,
            Err(e) => {
                warn!(hand = %frame.hand, error = %e, "rejected frame");
                if let Some(stats) = &self.stats {
                    stats.record_frame_rejected();
                }
                return Err(e);
            }
        };

        let now = frame.timestamp;
        let hand = frame.hand;
        let state = self.hands.entry(hand).or_insert_with(|| {
            debug!(hand = %hand, "tracking new hand");
            HandState::new(now)
        });

        if let Some(stats) = &self.stats {
            let interval = (now - state.last_frame_at).num_milliseconds();
            stats.record_frame_processed(if interval > 0 {
                Some(interval as f64)
            } else {
                None
            });
        }
        state.last_frame_at = now;

        let mut surfaced: Vec<(Gesture, Option<HandLandmarks>)> = Vec::new();

        if let Some(gesture) = classify_static(&landmarks, &mut state.pinch, now, &self.config.pose)
        {
            if state
                .debounce
                .should_surface(gesture.kind, now, &self.config.debounce)
            {
                surfaced.push((gesture, Some(landmarks)));
            } else {
                trace!(hand = %hand, gesture = %gesture.kind, "debounced");
            }
        }

        let wrist = landmarks.wrist();
        let confidence = self.config.pose.confidence;
        if state.wave.update(wrist.x, now, &self.config.wave) {
            surfaced.push((Gesture::wave(confidence), None));
        }
        if let Some(swipe) = state.swipe.update(wrist.x, wrist.y, now, &self.config.swipe) {
            surfaced.push((
                Gesture::swipe(swipe.direction, swipe.speed, confidence),
                None,
            ));
        }

        let notifications: Vec<GestureNotification> = surfaced
            .into_iter()
            .map(|(gesture, landmarks)| GestureNotification {
                gesture,
                hand,
                handedness: hand.handedness,
                landmarks,
                timestamp: now,
            })
            .collect();

        for notification in &notifications {
            debug!(
                hand = %hand,
                gesture = %notification.gesture.kind,
                direction = ?notification.gesture.direction,
                "gesture"
            );
            if let Some(stats) = &self.stats {
                stats.record_gesture(notification.gesture.kind);
            }
            self.listeners.notify(notification);
        }

        Ok(notifications)
    }

    /// Discard all state for one hand. Returns false if the hand was unknown.
    pub fn reset(&mut self, hand: &HandIdentity) -> bool {
        let existed = self.hands.remove(hand).is_some();
        if existed {
            debug!(hand = %hand, "hand state reset");
            if let Some(stats) = &self.stats {
                stats.record_hand_reset();
            }
        }
        existed
    }

    /// Discard state for every hand, as when tracking stops.
    pub fn reset_all(&mut self) {
        let hands: Vec<HandIdentity> = self.hands.keys().copied().collect();
        for hand in hands {
            self.reset(&hand);
        }
    }

    /// Number of hands with live state.
    pub fn tracked_hands(&self) -> usize {
        self.hands.len()
    }

    pub fn is_tracking(&self, hand: &HandIdentity) -> bool {
        self.hands.contains_key(hand)
    }

    /// Register a callback. Listeners are called in registration order.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GestureNotification) + Send + 'static,
    {
        self.listeners.add(Box::new(listener))
    }

    /// Receive notifications over a channel instead of a callback.
    ///
    /// Dropping the receiver unsubscribes it on the next notification.
    pub fn subscribe_channel(&mut self) -> (ListenerId, Receiver<GestureNotification>) {
        self.listeners.add_channel()
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}
