/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

mod support;

use integration_test_utils::{
    CallLog, RecordingExporter, RecordingOutboundClient, RecordingSubscription,
};
use mqtt_pulsar_streamer::{
    spawn_delivery, InboundMessage, LifecycleState, RouteOutcome, ShutdownStep,
    DEFAULT_INBOUND_DISCONNECT_TIMEOUT,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

async fn route_topics(streamer: &mqtt_pulsar_streamer::MqttPulsarStreamer, topics: &[&str]) {
    let router = streamer.router();
    for topic in topics {
        let outcome = router.route(InboundMessage::new(*topic, &b"v"[..])).await;
        assert!(matches!(outcome, RouteOutcome::Forwarded { .. }));
    }
}

#[tokio::test]
async fn shutdown_closes_every_producer_once_then_transports_then_exporters() {
    integration_test_utils::init_logging();
    let log = CallLog::new();
    let client = support::recording_client(&log);
    let streamer = support::make_streamer("ordered", client.clone());
    route_topics(&streamer, &["device/1/a", "device/2/b", "device/3/c"]).await;

    let inbound = Arc::new(RecordingSubscription::new(log.clone()));
    let exporter = Arc::new(RecordingExporter::new("metrics", log.clone()));
    let coordinator = streamer
        .shutdown_coordinator(inbound.clone())
        .with_exporter(exporter.clone());

    let report = coordinator.shutdown().await;

    assert!(report.is_clean());
    assert!(!report.skipped);
    assert_eq!(report.producers_attempted, 3);
    assert!(client
        .all_producers()
        .iter()
        .all(|producer| producer.close_count() == 1));
    assert_eq!(inbound.disconnect_count(), 1);
    assert_eq!(client.close_count(), 1);
    assert_eq!(exporter.flush_count(), 1);
    assert_eq!(exporter.stop_count(), 1);

    let last_producer_close = log
        .entries()
        .iter()
        .rposition(|entry| entry.starts_with("producer.close:"))
        .expect("producers were closed");
    let disconnect = log.position("inbound.disconnect").expect("inbound disconnected");
    let client_close = log.position("client.close").expect("client closed");
    let flush = log.position("exporter.flush:metrics").expect("exporter flushed");
    let stop = log.position("exporter.stop:metrics").expect("exporter stopped");
    assert!(last_producer_close < disconnect);
    assert!(disconnect < client_close);
    assert!(client_close < flush);
    assert!(flush < stop);
}

#[tokio::test]
async fn shutdown_continues_past_every_failing_step() {
    let log = CallLog::new();
    let client = Arc::new(
        RecordingOutboundClient::new(log.clone())
            .with_failing_producer_close("persistent://public/default/2/b")
            .with_failing_close(),
    );
    let streamer = support::make_streamer("failing", client.clone());
    route_topics(&streamer, &["device/1/a", "device/2/b", "device/3/c"]).await;

    let inbound = Arc::new(RecordingSubscription::new(log.clone()).with_failing_disconnect());
    let exporter = Arc::new(
        RecordingExporter::new("profiler", log.clone())
            .with_failing_flush()
            .with_failing_stop(),
    );
    let trailing_exporter = Arc::new(RecordingExporter::new("metrics", log.clone()));
    let coordinator = streamer
        .shutdown_coordinator(inbound.clone())
        .with_exporter(exporter.clone())
        .with_exporter(trailing_exporter.clone());

    let report = coordinator.shutdown().await;

    let failed_steps: Vec<ShutdownStep> = report.failures.iter().map(|f| f.step).collect();
    assert_eq!(
        failed_steps,
        vec![
            ShutdownStep::CloseProducer,
            ShutdownStep::DisconnectInbound,
            ShutdownStep::CloseOutbound,
            ShutdownStep::FlushExporter,
            ShutdownStep::StopExporter,
        ]
    );
    assert_eq!(report.failures[0].target, "persistent://public/default/2/b");
    assert!(client
        .all_producers()
        .iter()
        .all(|producer| producer.close_count() == 1));
    assert_eq!(client.close_count(), 1);
    assert_eq!(exporter.stop_count(), 1);
    assert_eq!(trailing_exporter.flush_count(), 1);
    assert_eq!(trailing_exporter.stop_count(), 1);
}

#[tokio::test]
async fn producer_created_during_shutdown_is_closed_before_outbound_client() {
    let log = CallLog::new();
    let client = Arc::new(
        RecordingOutboundClient::new(log.clone()).with_create_delay(Duration::from_millis(200)),
    );
    let streamer = support::make_streamer("in-flight", client.clone());

    let delivery = spawn_delivery(
        streamer.listener(),
        InboundMessage::new("device/1/a", &b"v"[..]),
    );
    tokio::time::sleep(Duration::from_millis(20)).await;

    let report = streamer
        .shutdown_coordinator(Arc::new(RecordingSubscription::new(log.clone())))
        .shutdown()
        .await;

    assert!(report.is_clean());
    assert_eq!(report.producers_attempted, 1);
    let producer_close = log
        .position("producer.close:persistent://public/default/1/a")
        .expect("in-flight producer closed during shutdown");
    let disconnect = log.position("inbound.disconnect").expect("inbound disconnected");
    let client_close = log.position("client.close").expect("client closed");
    assert!(producer_close < disconnect);
    assert!(disconnect < client_close);

    delivery.await.expect("delivery task should finish");
    let producers = client.all_producers();
    assert_eq!(producers.len(), 1);
    assert_eq!(producers[0].close_count(), 1);
    assert!(producers[0].sent().is_empty());
}

#[tokio::test]
async fn messages_after_shutdown_start_create_no_producers() {
    let log = CallLog::new();
    let client = support::recording_client(&log);
    let streamer = support::make_streamer("late", client.clone());
    route_topics(&streamer, &["device/1/a"]).await;

    let coordinator = streamer.shutdown_coordinator(Arc::new(RecordingSubscription::new(log)));
    coordinator.shutdown().await;

    let outcome = streamer
        .router()
        .route(InboundMessage::new("device/9/new", &b"v"[..]))
        .await;

    assert_eq!(outcome, RouteOutcome::ShuttingDown);
    assert_eq!(client.create_count(), 1);
    assert!(streamer.registry().is_empty().await);
    assert_eq!(streamer.state(), LifecycleState::ShuttingDown);
}

#[tokio::test]
async fn second_shutdown_is_skipped_without_touching_collaborators() {
    let log = CallLog::new();
    let client = support::recording_client(&log);
    let streamer = support::make_streamer("twice", client.clone());
    route_topics(&streamer, &["device/1/a"]).await;

    let inbound = Arc::new(RecordingSubscription::new(log.clone()));
    let coordinator = streamer.shutdown_coordinator(inbound.clone());

    let first = coordinator.shutdown().await;
    let second = coordinator.shutdown().await;

    assert!(!first.skipped);
    assert!(second.skipped);
    assert_eq!(inbound.disconnect_count(), 1);
    assert_eq!(client.close_count(), 1);
    assert_eq!(client.producers_for("persistent://public/default/1/a")[0].close_count(), 1);
}

#[tokio::test]
async fn inbound_disconnect_uses_configured_timeout() {
    let log = CallLog::new();
    let streamer = support::make_streamer("timeout", support::recording_client(&log));
    let inbound = Arc::new(RecordingSubscription::new(log.clone()));

    streamer
        .shutdown_coordinator(inbound.clone())
        .shutdown()
        .await;
    assert_eq!(inbound.last_timeout(), Some(DEFAULT_INBOUND_DISCONNECT_TIMEOUT));

    let other = support::make_streamer("timeout-custom", support::recording_client(&log));
    let other_inbound = Arc::new(RecordingSubscription::new(log));
    other
        .shutdown_coordinator(other_inbound.clone())
        .with_inbound_disconnect_timeout(Duration::from_secs(2))
        .shutdown()
        .await;
    assert_eq!(other_inbound.last_timeout(), Some(Duration::from_secs(2)));
}

#[tokio::test]
async fn shutdown_on_waits_for_signal() {
    let log = CallLog::new();
    let streamer = support::make_streamer("signal", support::recording_client(&log));
    let inbound = Arc::new(RecordingSubscription::new(log));
    let coordinator = streamer.shutdown_coordinator(inbound.clone());
    let (trigger, signal) = oneshot::channel::<()>();

    let waiting = tokio::spawn(async move {
        coordinator
            .shutdown_on(async {
                let _ = signal.await;
            })
            .await
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(inbound.disconnect_count(), 0);
    assert_eq!(streamer.state(), LifecycleState::Running);

    trigger.send(()).expect("coordinator should be waiting");
    let report = waiting.await.expect("shutdown task should finish");

    assert!(report.is_clean());
    assert_eq!(inbound.disconnect_count(), 1);
    assert_eq!(streamer.state(), LifecycleState::ShuttingDown);
}
