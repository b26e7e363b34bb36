//! Debouncing of static gestures and fan-out to listeners.

use crate::config::{chrono_duration, duration_ms};
use crate::core::gesture::{GestureKind, GestureNotification};
use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// Debounce settings for static gestures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Minimum gap before the same static gesture is surfaced again
    #[serde(with = "duration_ms")]
    pub repeat_after: std::time::Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            repeat_after: std::time::Duration::from_millis(500),
        }
    }
}

/// Last surfaced static gesture for one hand.
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    last: Option<(GestureKind, DateTime<Utc>)>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether a candidate should reach listeners, recording it if so.
    ///
    /// Wave and swipe always pass and leave the record untouched. Pinch always
    /// passes so its strength can be followed frame by frame. Point, open and
    /// grab pass when the name changed or the repeat interval has elapsed.
    pub fn should_surface(
        &mut self,
        kind: GestureKind,
        now: DateTime<Utc>,
        config: &DebounceConfig,
    ) -> bool {
        if kind.is_temporal() {
            return true;
        }

        let pass = kind == GestureKind::Pinch
            || match self.last {
                Some((last_kind, last_time)) if last_kind == kind => {
                    now - last_time >= chrono_duration(config.repeat_after)
                }
                _ => true,
            };

        if pass {
            self.last = Some((kind, now));
        }
        pass
    }

    pub fn last_gesture(&self) -> Option<GestureKind> {
        self.last.map(|(kind, _)| kind)
    }
}

/// Handle returned by [`ListenerRegistry::add`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Boxed gesture callback.
pub type Listener = Box<dyn FnMut(&GestureNotification) + Send>;

enum Entry {
    Callback(Listener),
    Channel(Sender<GestureNotification>),
}

/// Ordered set of listeners. Notification follows registration order.
///
/// Channel listeners whose receiver has been dropped are pruned on the next
/// notification.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(ListenerId, Entry)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, entry: Entry) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, entry));
        id
    }

    pub fn add(&mut self, listener: Listener) -> ListenerId {
        self.push(Entry::Callback(listener))
    }

    /// Register a channel-backed listener and return its receiving end.
    pub fn add_channel(&mut self) -> (ListenerId, Receiver<GestureNotification>) {
        let (sender, receiver) = unbounded();
        (self.push(Entry::Channel(sender)), receiver)
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn notify(&mut self, notification: &GestureNotification) {
        self.listeners.retain_mut(|(id, entry)| match entry {
            Entry::Callback(listener) => {
                listener(notification);
                true
            }
            Entry::Channel(sender) => {
                let alive = sender.send(notification.clone()).is_ok();
                if !alive {
                    tracing::trace!(listener = id.0, "channel listener dropped");
                }
                alive
            }
        });
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gesture::Gesture;
    use crate::source::types::HandIdentity;
    use chrono::Duration;
    use std::sync::{Arc, Mutex};

    fn ms(t0: DateTime<Utc>, ms: i64) -> DateTime<Utc> {
        t0 + Duration::milliseconds(ms)
    }

    #[test]
    fn test_same_gesture_debounced() {
        let config = DebounceConfig::default();
        let mut debounce = Debouncer::new();
        let t0 = Utc::now();

        assert!(debounce.should_surface(GestureKind::Open, t0, &config));
        assert!(!debounce.should_surface(GestureKind::Open, ms(t0, 100), &config));
        assert!(!debounce.should_surface(GestureKind::Open, ms(t0, 499), &config));
        assert!(debounce.should_surface(GestureKind::Open, ms(t0, 500), &config));
    }

    #[test]
    fn test_changed_gesture_passes() {
        let config = DebounceConfig::default();
        let mut debounce = Debouncer::new();
        let t0 = Utc::now();

        assert!(debounce.should_surface(GestureKind::Open, t0, &config));
        assert!(debounce.should_surface(GestureKind::Grab, ms(t0, 30), &config));
        assert!(debounce.should_surface(GestureKind::Open, ms(t0, 60), &config));
        assert_eq!(debounce.last_gesture(), Some(GestureKind::Open));
    }

    #[test]
    fn test_pinch_and_temporal_bypass() {
        let config = DebounceConfig::default();
        let mut debounce = Debouncer::new();
        let t0 = Utc::now();

        for i in 0..5 {
            assert!(debounce.should_surface(GestureKind::Pinch, ms(t0, i * 30), &config));
        }
        assert!(debounce.should_surface(GestureKind::Wave, ms(t0, 150), &config));
        assert!(debounce.should_surface(GestureKind::Swipe, ms(t0, 160), &config));
        // Temporal gestures do not overwrite the static record
        assert_eq!(debounce.last_gesture(), Some(GestureKind::Pinch));
    }

    fn notification() -> GestureNotification {
        let hand = HandIdentity::right();
        GestureNotification {
            gesture: Gesture::wave(0.9),
            hand,
            handedness: hand.handedness,
            landmarks: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_registry_order_and_removal() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();

        let a = {
            let log = log.clone();
            registry.add(Box::new(move |_: &GestureNotification| log.lock().unwrap().push("a")))
        };
        {
            let log = log.clone();
            registry.add(Box::new(move |_: &GestureNotification| log.lock().unwrap().push("b")));
        }

        registry.notify(&notification());
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);

        assert!(registry.remove(a));
        assert!(!registry.remove(a));
        registry.notify(&notification());
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "b"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_channel_listener() {
        let mut registry = ListenerRegistry::new();
        let (_, rx) = registry.add_channel();
        registry.notify(&notification());
        assert_eq!(rx.try_recv().unwrap().gesture, Gesture::wave(0.9));

        drop(rx);
        registry.notify(&notification());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_dropped_channels_are_pruned() {
        let mut registry = ListenerRegistry::new();
        let log = Arc::new(Mutex::new(0));
        {
            let log = log.clone();
            registry.add(Box::new(move |_: &GestureNotification| *log.lock().unwrap() += 1));
        }
        for _ in 0..100 {
            drop(registry.add_channel());
        }
        let (kept, rx) = registry.add_channel();
        assert_eq!(registry.len(), 102);

        registry.notify(&notification());
        assert_eq!(registry.len(), 2);
        assert_eq!(*log.lock().unwrap(), 1);
        assert!(rx.try_recv().is_ok());

        assert!(registry.remove(kept));
        registry.notify(&notification());
        assert!(rx.try_recv().is_err());
    }
}
