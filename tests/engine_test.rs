//! Behavioural tests for the gesture engine through its public API.

use chrono::{DateTime, Duration, TimeZone, Utc};
use handplay_gesture_engine::core::classifier::{resolve_point_direction, PointConfig};
use handplay_gesture_engine::core::geometry::Vec3;
use handplay_gesture_engine::source::{pose_points, HandPose};
use handplay_gesture_engine::{
    Direction, EngineConfig, FrameError, GestureEngine, GestureKind, GestureNotification,
    HandFrame, HandIdentity,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
}

fn at(ms: i64) -> DateTime<Utc> {
    t0() + Duration::milliseconds(ms)
}

fn frame(pose: HandPose, x: f64, y: f64, ms: i64) -> HandFrame {
    HandFrame::new(HandIdentity::right(), pose_points(pose, x, y), at(ms))
}

fn count(notifications: &[GestureNotification], kind: GestureKind) -> usize {
    notifications
        .iter()
        .filter(|n| n.gesture.kind == kind)
        .count()
}

#[test]
fn test_extended_fingers_classify_as_open_only() {
    let mut engine = GestureEngine::new(EngineConfig::default());

    for (i, x) in [0.4, 0.6].into_iter().enumerate() {
        let out = engine
            .process_frame(&frame(HandPose::Open, x, 0.7, i as i64 * 600))
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].gesture.kind, GestureKind::Open);
    }
}

#[test]
fn test_pinch_hysteresis() {
    let mut engine = GestureEngine::new(EngineConfig::default());
    let gaps = [0.1, 0.04, 0.06, 0.08];
    let expected = [
        GestureKind::Open,
        GestureKind::Pinch,
        GestureKind::Pinch,
        GestureKind::Open,
    ];

    for (i, (gap, kind)) in gaps.iter().zip(expected).enumerate() {
        let out = engine
            .process_frame(&frame(HandPose::Pinch { gap: *gap }, 0.5, 0.7, i as i64 * 100))
            .unwrap();
        assert_eq!(out.len(), 1, "gap {gap}");
        assert_eq!(out[0].gesture.kind, kind, "gap {gap}");
    }
}

#[test]
fn test_pinch_reports_strength_and_hold() {
    let mut engine = GestureEngine::new(EngineConfig::default());
    engine
        .process_frame(&frame(HandPose::Pinch { gap: 0.02 }, 0.5, 0.7, 0))
        .unwrap();
    let out = engine
        .process_frame(&frame(HandPose::Pinch { gap: 0.02 }, 0.5, 0.7, 250))
        .unwrap();

    let pinch = &out[0].gesture;
    assert_eq!(pinch.kind, GestureKind::Pinch);
    assert!((pinch.strength.unwrap() - 0.6).abs() < 1e-6);
    assert_eq!(pinch.duration_ms, Some(250));
}

#[test]
fn test_wave_once_then_cooldown() {
    let mut engine = GestureEngine::new(EngineConfig::default());
    let xs = [0.5, 0.55, 0.6, 0.55, 0.5, 0.55, 0.6];

    let mut waves = 0;
    for (i, x) in xs.iter().enumerate() {
        let out = engine
            .process_frame(&frame(HandPose::Open, *x, 0.7, i as i64 * 100))
            .unwrap();
        waves += count(&out, GestureKind::Wave);
    }
    assert_eq!(waves, 1);

    // Same oscillation again straight away, inside the cooldown.
    let mut repeated = 0;
    for (i, x) in xs.iter().enumerate().skip(1) {
        let out = engine
            .process_frame(&frame(HandPose::Open, *x, 0.7, 600 + i as i64 * 100))
            .unwrap();
        repeated += count(&out, GestureKind::Wave);
    }
    assert_eq!(repeated, 0);
}

#[test]
fn test_swipe_right_then_refractory() {
    let mut engine = GestureEngine::new(EngineConfig::default());
    let motion = [(0.3, 0.5), (0.35, 0.5025), (0.4, 0.505), (0.45, 0.5075), (0.5, 0.51)];

    let mut swipes = Vec::new();
    for (i, (x, y)) in motion.iter().enumerate() {
        let out = engine
            .process_frame(&frame(HandPose::Open, *x, *y, i as i64 * 75))
            .unwrap();
        swipes.extend(out.into_iter().filter(|n| n.gesture.kind == GestureKind::Swipe));
    }
    assert_eq!(swipes.len(), 1);
    assert_eq!(swipes[0].gesture.direction, Some(Direction::Right));
    let json = serde_json::to_value(&swipes[0].gesture).unwrap();
    assert_eq!(json["name"], "swipe");
    assert_eq!(json["direction"], "right");

    // Identical motion 400ms later is inside the refractory period.
    let mut repeated = 0;
    for (i, (x, y)) in motion.iter().enumerate() {
        let out = engine
            .process_frame(&frame(HandPose::Open, *x, *y, 400 + i as i64 * 75))
            .unwrap();
        repeated += count(&out, GestureKind::Swipe);
    }
    assert_eq!(repeated, 0);
}

#[test]
fn test_static_repeat_after_gap() {
    let mut engine = GestureEngine::new(EngineConfig::default());

    let first = engine
        .process_frame(&frame(HandPose::Point, 0.5, 0.7, 0))
        .unwrap();
    let second = engine
        .process_frame(&frame(HandPose::Point, 0.5, 0.7, 500))
        .unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].gesture, second[0].gesture);
    assert_eq!(first[0].landmarks, second[0].landmarks);

    let mut engine = GestureEngine::new(EngineConfig::default());
    engine
        .process_frame(&frame(HandPose::Point, 0.5, 0.7, 0))
        .unwrap();
    let suppressed = engine
        .process_frame(&frame(HandPose::Point, 0.5, 0.7, 300))
        .unwrap();
    assert!(suppressed.is_empty());
}

#[test]
fn test_short_landmark_set_rejected() {
    let mut engine = GestureEngine::new(EngineConfig::default());
    let mut points = pose_points(HandPose::Open, 0.5, 0.7);
    points.pop();
    let short = HandFrame::new(HandIdentity::right(), points, at(0));

    let result = engine.process_frame(&short);
    assert_eq!(
        result,
        Err(FrameError::WrongLandmarkCount {
            expected: 21,
            actual: 20
        })
    );
    assert_eq!(engine.tracked_hands(), 0);
}

#[test]
fn test_rejected_frame_leaves_state_untouched() {
    let mut engine = GestureEngine::new(EngineConfig::default());
    engine
        .process_frame(&frame(HandPose::Point, 0.5, 0.7, 0))
        .unwrap();

    let mut points = pose_points(HandPose::Grab, 0.5, 0.7);
    points.truncate(20);
    assert!(engine
        .process_frame(&HandFrame::new(HandIdentity::right(), points, at(100)))
        .is_err());

    // Debounce still remembers the point from t=0.
    let out = engine
        .process_frame(&frame(HandPose::Point, 0.5, 0.7, 300))
        .unwrap();
    assert!(out.is_empty());
    assert_eq!(engine.tracked_hands(), 1);
}

fn corrupt(mut frame: HandFrame, value: f64) -> HandFrame {
    frame.landmarks[0].x = value;
    frame
}

#[test]
fn test_non_finite_frame_keeps_pinch_hold() {
    let mut engine = GestureEngine::new(EngineConfig::default());
    engine
        .process_frame(&frame(HandPose::Pinch { gap: 0.02 }, 0.5, 0.7, 0))
        .unwrap();

    let bad = corrupt(frame(HandPose::Pinch { gap: 0.02 }, 0.5, 0.7, 100), f64::INFINITY);
    assert_eq!(
        engine.process_frame(&bad),
        Err(FrameError::NonFiniteCoordinate { index: 0 })
    );

    // Inside the release band, so the hold started at t=0 continues.
    let out = engine
        .process_frame(&frame(HandPose::Pinch { gap: 0.06 }, 0.5, 0.7, 200))
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].gesture.kind, GestureKind::Pinch);
    assert_eq!(out[0].gesture.duration_ms, Some(200));
}

#[test]
fn test_non_finite_frame_keeps_wave_progress() {
    let mut engine = GestureEngine::new(EngineConfig::default());
    let xs = [0.5, 0.55, 0.6, 0.55, 0.5, 0.55];

    for (i, x) in xs.iter().enumerate() {
        let out = engine
            .process_frame(&frame(HandPose::Open, *x, 0.7, i as i64 * 100))
            .unwrap();
        assert_eq!(count(&out, GestureKind::Wave), 0);
    }

    let bad = corrupt(frame(HandPose::Open, 0.9, 0.7, 550), f64::NAN);
    assert!(matches!(
        engine.process_frame(&bad),
        Err(FrameError::NonFiniteCoordinate { .. })
    ));

    let out = engine
        .process_frame(&frame(HandPose::Open, 0.6, 0.7, 600))
        .unwrap();
    assert_eq!(count(&out, GestureKind::Wave), 1);
}

#[test]
fn test_point_direction_resolution() {
    let config = PointConfig::default();
    assert_eq!(
        resolve_point_direction(Vec3::new(0.0, 0.0, -0.2), &config),
        Direction::Forward
    );
    assert_eq!(
        resolve_point_direction(Vec3::new(0.2, 0.2, 0.0), &config),
        Direction::BottomRight
    );
    assert_eq!(
        resolve_point_direction(Vec3::new(0.2, 0.0, 0.0), &config),
        Direction::Right
    );
}

#[test]
fn test_listeners_receive_in_order() {
    use std::sync::{Arc, Mutex};

    let mut engine = GestureEngine::new(EngineConfig::default());
    let seen = Arc::new(Mutex::new(Vec::new()));

    for tag in ["first", "second"] {
        let seen = seen.clone();
        engine.subscribe(move |n: &GestureNotification| {
            seen.lock().unwrap().push((tag, n.gesture.kind));
        });
    }
    let (_, channel) = engine.subscribe_channel();

    engine
        .process_frame(&frame(HandPose::Grab, 0.5, 0.7, 0))
        .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![("first", GestureKind::Grab), ("second", GestureKind::Grab)]
    );
    assert_eq!(channel.try_recv().unwrap().gesture.kind, GestureKind::Grab);
}
