//! Integration tests for the gesture HTTP server

#[cfg(feature = "server")]
mod server_tests {
    use chrono::{Duration as ChronoDuration, Utc};
    use handplay_gesture_engine::server::{run, ServerConfig};
    use handplay_gesture_engine::source::{pose_points, HandPose};
    use handplay_gesture_engine::{EngineConfig, HandFrame, HandIdentity};
    use std::time::Duration;

    async fn start() -> (String, tokio::sync::oneshot::Sender<()>) {
        let config = ServerConfig::new(0, EngineConfig::default());
        let (addr, shutdown_tx) = run(config).await.expect("Failed to start server");

        // Give server time to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        (format!("http://{}", addr), shutdown_tx)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (base, shutdown_tx) = start().await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", base))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["status"], "ok");
        assert!(body["version"].as_str().is_some());

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_frames_endpoint_classifies() {
        let (base, shutdown_tx) = start().await;

        let frame = HandFrame::new(
            HandIdentity::right(),
            pose_points(HandPose::Grab, 0.5, 0.7),
            Utc::now(),
        );

        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}/frames", base))
            .json(&frame)
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        let gestures = body["gestures"].as_array().expect("gestures array");
        assert_eq!(gestures.len(), 1);
        assert_eq!(gestures[0]["gesture"]["name"], "grab");
        assert_eq!(gestures[0]["hand"]["handedness"], "Right");

        // Same pose 100ms later is debounced.
        let repeat = HandFrame::new(
            HandIdentity::right(),
            pose_points(HandPose::Grab, 0.5, 0.7),
            frame.timestamp + ChronoDuration::milliseconds(100),
        );
        let body: serde_json::Value = client
            .post(format!("{}/frames", base))
            .json(&repeat)
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        assert_eq!(body["gestures"].as_array().map(|g| g.len()), Some(0));

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_malformed_frame_rejected() {
        let (base, shutdown_tx) = start().await;

        let mut points = pose_points(HandPose::Open, 0.5, 0.7);
        points.truncate(20);
        let frame = HandFrame::new(HandIdentity::left(), points, Utc::now());

        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}/frames", base))
            .json(&frame)
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status().as_u16(), 422);

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["code"], "INVALID_FRAME");
        assert!(body["error"].as_str().unwrap().contains("20"));

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_reset_endpoint() {
        let (base, shutdown_tx) = start().await;
        let client = reqwest::Client::new();

        for hand in [HandIdentity::left(), HandIdentity::right()] {
            let frame = HandFrame::new(hand, pose_points(HandPose::Open, 0.5, 0.7), Utc::now());
            client
                .post(format!("{}/frames", base))
                .json(&frame)
                .send()
                .await
                .expect("Failed to send request");
        }

        let body: serde_json::Value = client
            .post(format!("{}/reset", base))
            .json(&serde_json::json!({ "hand": { "handedness": "Left", "slot": 0 } }))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["tracked_hands"], 1);

        let body: serde_json::Value = client
            .post(format!("{}/reset", base))
            .json(&serde_json::json!({}))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        assert_eq!(body["tracked_hands"], 0);

        let stats: serde_json::Value = client
            .get(format!("{}/stats", base))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        assert_eq!(stats["frames_processed"], 2);
        assert_eq!(stats["hand_resets"], 2);

        let _ = shutdown_tx.send(());
    }
}
