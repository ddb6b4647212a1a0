//! Integration Test: 監視ラウンドのシナリオ
//!
//! 実HTTPサーバー（wiremock）に対してラウンドを実行し、
//! 結果の順序・失敗時の番兵値・閾値アラートを確認する。

use crate::support::{
    mount_service, recording_sink, test_registry, FailingSink, UNREACHABLE_URL,
};
use apimon::alert::AlertEvent;
use apimon::common::error::{CommonError, MonitorError};
use apimon::common::types::{ServiceDescriptor, FAILURE_SENTINEL_STATUS};
use apimon::registry::RoundMode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::MockServer;

#[tokio::test]
async fn fast_service_and_timed_out_service() {
    let server = MockServer::start().await;
    mount_service(&server, "/a", 200, Duration::from_millis(50)).await;
    mount_service(&server, "/b", 200, Duration::from_secs(3)).await;

    let (recorder, sink) = recording_sink();
    let registry = test_registry(sink, Duration::from_millis(500), RoundMode::Parallel);
    registry
        .register(ServiceDescriptor::new(
            "Service A",
            format!("{}/a", server.uri()),
            Duration::from_secs(30),
            Duration::from_millis(200),
        ))
        .await
        .unwrap();
    registry
        .register(ServiceDescriptor::new(
            "Service B",
            format!("{}/b", server.uri()),
            Duration::from_secs(60),
            Duration::from_millis(500),
        ))
        .await
        .unwrap();

    let results = registry.run_round().await.unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].status, 200);
    assert!(results[0].response_time >= 50);
    assert!(results[0].error.is_none());

    assert_eq!(results[1].status, FAILURE_SENTINEL_STATUS);
    assert_eq!(results[1].response_time, 0);
    let error = results[1].error.as_deref().unwrap();
    assert!(error.contains("timed out"), "unexpected error: {}", error);

    assert_eq!(recorder.failure_alerts_for("Service B"), 1);
    assert_eq!(recorder.failure_alerts_for("Service A"), 0);
    assert_eq!(recorder.threshold_alerts_for("Service A"), 0);
}

#[tokio::test]
async fn slow_response_raises_threshold_alert_but_result_is_success() {
    let server = MockServer::start().await;
    mount_service(&server, "/slow", 200, Duration::from_millis(300)).await;

    let (recorder, sink) = recording_sink();
    let registry = test_registry(sink, Duration::from_secs(5), RoundMode::Parallel);
    registry
        .register(ServiceDescriptor::new(
            "Service A",
            format!("{}/slow", server.uri()),
            Duration::from_secs(30),
            Duration::from_millis(200),
        ))
        .await
        .unwrap();

    let results = registry.run_round().await.unwrap();
    assert_eq!(results[0].status, 200);
    assert!(results[0].response_time >= 300);
    assert!(!results[0].is_failure());

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert_eq!(recorder.threshold_alerts_for("Service A"), 1);
    match &events[0] {
        AlertEvent::ThresholdExceeded {
            latency_ms,
            threshold_ms,
            status,
            ..
        } => {
            assert_eq!(*latency_ms, results[0].response_time);
            assert_eq!(*threshold_ms, 200);
            assert!(latency_ms > threshold_ms);
            assert_eq!(*status, 200);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(
        events[0].message(),
        format!(
            "Response time exceeded threshold: {}ms > 200ms",
            results[0].response_time
        )
    );
}

#[tokio::test]
async fn threshold_alerts_agree_with_reported_response_time() {
    let server = MockServer::start().await;
    mount_service(&server, "/edge", 200, Duration::from_millis(100)).await;

    let (recorder, sink) = recording_sink();
    let registry = test_registry(sink, Duration::from_secs(2), RoundMode::Parallel);
    for threshold_ms in 100..=103u64 {
        registry
            .register(ServiceDescriptor::new(
                format!("edge-{}", threshold_ms),
                format!("{}/edge", server.uri()),
                Duration::from_secs(30),
                Duration::from_millis(threshold_ms),
            ))
            .await
            .unwrap();
    }

    for _ in 0..3 {
        let before = recorder.events().len();
        let results = registry.run_round().await.unwrap();
        let events = recorder.events()[before..].to_vec();

        for (result, threshold_ms) in results.iter().zip(100..=103u64) {
            let service = format!("edge-{}", threshold_ms);
            let alert = events.iter().find(|e| e.service() == service);
            match alert {
                Some(AlertEvent::ThresholdExceeded {
                    latency_ms,
                    threshold_ms: reported,
                    ..
                }) => {
                    assert_eq!(*latency_ms, result.response_time);
                    assert_eq!(*reported, threshold_ms);
                    assert!(result.response_time > threshold_ms);
                }
                Some(other) => panic!("unexpected event: {:?}", other),
                None => assert!(result.response_time <= threshold_ms),
            }
        }
    }
}

#[tokio::test]
async fn parallel_round_keeps_registration_order() {
    let server = MockServer::start().await;
    mount_service(&server, "/first", 201, Duration::from_millis(400)).await;
    mount_service(&server, "/second", 202, Duration::from_millis(0)).await;
    mount_service(&server, "/third", 203, Duration::from_millis(400)).await;

    let (_recorder, sink) = recording_sink();
    let registry = test_registry(sink, Duration::from_secs(5), RoundMode::Parallel);
    for (name, route) in [("first", "/first"), ("second", "/second"), ("third", "/third")] {
        registry
            .register(ServiceDescriptor::new(
                name,
                format!("{}{}", server.uri(), route),
                Duration::from_secs(30),
                Duration::from_secs(2),
            ))
            .await
            .unwrap();
    }

    let started = Instant::now();
    let results = registry.run_round().await.unwrap();
    let elapsed = started.elapsed();

    let statuses: Vec<u16> = results.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![201, 202, 203]);
    // 2つの400ms応答が並行して待たれる
    assert!(elapsed < Duration::from_millis(790), "round took {:?}", elapsed);
}

#[tokio::test]
async fn sequential_round_keeps_registration_order() {
    let server = MockServer::start().await;
    mount_service(&server, "/first", 201, Duration::from_millis(100)).await;
    mount_service(&server, "/second", 202, Duration::from_millis(0)).await;

    let (_recorder, sink) = recording_sink();
    let registry = test_registry(sink, Duration::from_secs(5), RoundMode::Sequential);
    for (name, route) in [("first", "/first"), ("second", "/second")] {
        registry
            .register(ServiceDescriptor::new(
                name,
                format!("{}{}", server.uri(), route),
                Duration::from_secs(30),
                Duration::from_secs(2),
            ))
            .await
            .unwrap();
    }

    let results = registry.run_round().await.unwrap();
    let statuses: Vec<u16> = results.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![201, 202]);
}

#[tokio::test]
async fn repeated_rounds_produce_same_shape() {
    let server = MockServer::start().await;
    mount_service(&server, "/a", 200, Duration::ZERO).await;
    mount_service(&server, "/b", 204, Duration::ZERO).await;

    let (_recorder, sink) = recording_sink();
    let registry = test_registry(sink, Duration::from_secs(5), RoundMode::Parallel);
    for (name, route) in [("Service A", "/a"), ("Service B", "/b")] {
        registry
            .register(ServiceDescriptor::new(
                name,
                format!("{}{}", server.uri(), route),
                Duration::from_secs(30),
                Duration::from_secs(2),
            ))
            .await
            .unwrap();
    }

    let first = registry.run_round().await.unwrap();
    let second = registry.run_round().await.unwrap();

    assert_eq!(first.len(), second.len());
    let first_statuses: Vec<u16> = first.iter().map(|r| r.status).collect();
    let second_statuses: Vec<u16> = second.iter().map(|r| r.status).collect();
    assert_eq!(first_statuses, vec![200, 204]);
    assert_eq!(first_statuses, second_statuses);
    assert_eq!(registry.len().await, 2);
}

#[tokio::test]
async fn empty_registry_returns_empty_round() {
    let (recorder, sink) = recording_sink();
    let registry = test_registry(sink, Duration::from_secs(1), RoundMode::Parallel);

    let results = registry.run_round().await.unwrap();
    assert!(results.is_empty());
    assert!(recorder.events().is_empty());
}

#[tokio::test]
async fn invalid_descriptor_leaves_registry_unchanged() {
    let (_recorder, sink) = recording_sink();
    let registry = test_registry(sink, Duration::from_secs(1), RoundMode::Parallel);
    registry
        .register(ServiceDescriptor::new(
            "Service A",
            "https://service-a.com/api",
            Duration::from_secs(30),
            Duration::from_millis(200),
        ))
        .await
        .unwrap();

    let err = registry
        .register(ServiceDescriptor::new(
            "",
            "https://service-b.com/api",
            Duration::from_secs(60),
            Duration::from_millis(500),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, MonitorError::Common(CommonError::Validation(_))));

    let err = registry
        .register(ServiceDescriptor::new(
            "Service B",
            "https://service-b.com/api",
            Duration::from_secs(60),
            Duration::ZERO,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, MonitorError::Common(CommonError::Validation(_))));

    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn remote_500_is_distinguishable_from_failure_sentinel() {
    let server = MockServer::start().await;
    mount_service(&server, "/broken", 500, Duration::ZERO).await;

    let (recorder, sink) = recording_sink();
    let registry = test_registry(sink, Duration::from_secs(2), RoundMode::Parallel);
    registry
        .register(ServiceDescriptor::new(
            "remote-500",
            format!("{}/broken", server.uri()),
            Duration::from_secs(30),
            Duration::from_secs(2),
        ))
        .await
        .unwrap();
    registry
        .register(ServiceDescriptor::new(
            "unreachable",
            UNREACHABLE_URL,
            Duration::from_secs(30),
            Duration::from_secs(2),
        ))
        .await
        .unwrap();

    let results = registry.run_round().await.unwrap();

    assert_eq!(results[0].status, 500);
    assert!(results[0].error.is_none());
    assert!(!results[0].is_failure());

    assert_eq!(results[1].status, FAILURE_SENTINEL_STATUS);
    assert_eq!(results[1].response_time, 0);
    assert!(results[1].is_failure());

    assert_eq!(recorder.failure_alerts_for("remote-500"), 0);
    assert_eq!(recorder.failure_alerts_for("unreachable"), 1);
}

#[tokio::test]
async fn failing_alert_sink_does_not_affect_results() {
    let server = MockServer::start().await;
    mount_service(&server, "/slow", 200, Duration::from_millis(150)).await;

    let registry = test_registry(
        Arc::new(FailingSink),
        Duration::from_secs(2),
        RoundMode::Parallel,
    );
    registry
        .register(ServiceDescriptor::new(
            "slow",
            format!("{}/slow", server.uri()),
            Duration::from_secs(30),
            Duration::from_millis(50),
        ))
        .await
        .unwrap();
    registry
        .register(ServiceDescriptor::new(
            "down",
            UNREACHABLE_URL,
            Duration::from_secs(30),
            Duration::from_millis(50),
        ))
        .await
        .unwrap();

    let results = registry.run_round().await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status, 200);
    assert!(results[0].error.is_none());
    assert!(results[1].is_failure());
}
