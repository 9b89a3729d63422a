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

//! Router that forwards each inbound message to the producer of its outbound topic.

use crate::control_plane::lifecycle::StreamerLifecycle;
use crate::data_plane::producer_registry::ProducerRegistry;
use crate::error::RegistryError;
use crate::message::InboundMessage;
use crate::metrics::StreamerMetrics;
use crate::observability::{events, fields};
use crate::routing::topic_mapper::TopicMapper;
use crate::transport::InboundListener;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info_span, warn, Instrument, Level};

const COMPONENT: &str = "message_router";

/// What happened to one routed message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RouteOutcome {
    Forwarded { outbound_topic: String },
    TopicRejected,
    ProducerUnavailable { outbound_topic: String },
    SendFailed { outbound_topic: String },
    ShuttingDown,
}

pub struct MessageRouter {
    mapper: TopicMapper,
    registry: Arc<ProducerRegistry>,
    metrics: StreamerMetrics,
    lifecycle: Arc<StreamerLifecycle>,
}

impl MessageRouter {
    pub fn new(
        mapper: TopicMapper,
        registry: Arc<ProducerRegistry>,
        metrics: StreamerMetrics,
        lifecycle: Arc<StreamerLifecycle>,
    ) -> Self {
        Self {
            mapper,
            registry,
            metrics,
            lifecycle,
        }
    }

    /// Maps, resolves the producer, sends and counts one message.
    ///
    /// Every failure is logged here and reported through the outcome; none of
    /// them stop later messages from being routed.
    pub async fn route(&self, message: InboundMessage) -> RouteOutcome {
        if !self.lifecycle.is_running() {
            debug!(
                event = events::ROUTE_DROP_SHUTTING_DOWN,
                component = COMPONENT,
                inbound_topic = message.topic(),
                "dropping message received during shutdown"
            );
            return RouteOutcome::ShuttingDown;
        }

        let outbound_topic = match self.mapper.map(message.topic()) {
            Ok(outbound_topic) => outbound_topic,
            Err(err) => {
                warn!(
                    event = events::ROUTE_TOPIC_REJECTED,
                    component = COMPONENT,
                    inbound_topic = message.topic(),
                    reason = fields::REASON_MISSING_REMAINDER,
                    err = %err,
                    "dropping message with unmappable topic"
                );
                return RouteOutcome::TopicRejected;
            }
        };

        let span = info_span!(
            "produce_to_pulsar",
            inbound_topic = message.topic(),
            outbound_topic = outbound_topic.as_str()
        );
        self.forward(message, outbound_topic).instrument(span).await
    }

    async fn forward(&self, message: InboundMessage, outbound_topic: String) -> RouteOutcome {
        if tracing::enabled!(Level::DEBUG) {
            debug!(
                event = events::ROUTE_RECEIVE,
                component = COMPONENT,
                payload_len = message.payload().len(),
                payload = %fields::format_payload_preview(message.payload()),
                "routing inbound message"
            );
        }

        let producer = match self.registry.get_or_create(&outbound_topic).await {
            Ok(producer) => producer,
            Err(RegistryError::Closed { .. }) => {
                debug!(
                    event = events::ROUTE_DROP_SHUTTING_DOWN,
                    component = COMPONENT,
                    reason = fields::REASON_REGISTRY_CLOSED,
                    "dropping message; producers are being closed"
                );
                return RouteOutcome::ShuttingDown;
            }
            Err(err) => {
                error!(
                    event = events::ROUTE_PRODUCER_UNAVAILABLE,
                    component = COMPONENT,
                    err = %err,
                    "failed to get or create producer"
                );
                return RouteOutcome::ProducerUnavailable { outbound_topic };
            }
        };

        if let Err(err) = producer.send(message.into_payload()).await {
            warn!(
                event = events::ROUTE_SEND_FAILED,
                component = COMPONENT,
                err = %err,
                "failed to send message"
            );
            return RouteOutcome::SendFailed { outbound_topic };
        }

        self.metrics.record_produced(&outbound_topic);
        debug!(
            event = events::ROUTE_SEND_OK,
            component = COMPONENT,
            "message processed"
        );
        RouteOutcome::Forwarded { outbound_topic }
    }
}

#[async_trait]
impl InboundListener for MessageRouter {
    async fn on_receive(&self, message: InboundMessage) {
        self.route(message).await;
    }
}

#[cfg(test)]
mod tests {
    use super::{MessageRouter, RouteOutcome};
    use crate::control_plane::lifecycle::StreamerLifecycle;
    use crate::data_plane::producer_registry::ProducerRegistry;
    use crate::error::{ErrorCode, TransportError};
    use crate::message::InboundMessage;
    use crate::metrics::StreamerMetrics;
    use crate::routing::topic_mapper::TopicMapper;
    use crate::transport::{OutboundClient, Producer};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};

    #[derive(Default)]
    struct RecordingProducer {
        sent: StdMutex<Vec<Bytes>>,
        fail_send: AtomicBool,
    }

    #[async_trait]
    impl Producer for RecordingProducer {
        async fn send(&self, payload: Bytes) -> Result<(), TransportError> {
            if self.fail_send.load(Ordering::SeqCst) {
                return Err(TransportError::fail_with_code(
                    ErrorCode::Unavailable,
                    "send rejected",
                ));
            }
            self.sent.lock().expect("lock sent").push(payload);
            Ok(())
        }

        async fn close(&self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingClient {
        producers: StdMutex<HashMap<String, Arc<RecordingProducer>>>,
        create_count: AtomicUsize,
        fail_create: AtomicBool,
        fail_send: bool,
    }

    impl RecordingClient {
        fn producer(&self, topic: &str) -> Option<Arc<RecordingProducer>> {
            self.producers.lock().expect("lock producers").get(topic).cloned()
        }
    }

    #[async_trait]
    impl OutboundClient for RecordingClient {
        async fn create_producer(&self, topic: &str) -> Result<Arc<dyn Producer>, TransportError> {
            self.create_count.fetch_add(1, Ordering::SeqCst);
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(TransportError::fail_with_code(
                    ErrorCode::Unavailable,
                    "no broker",
                ));
            }
            let producer = Arc::new(RecordingProducer {
                fail_send: AtomicBool::new(self.fail_send),
                ..Default::default()
            });
            self.producers
                .lock()
                .expect("lock producers")
                .insert(topic.to_string(), producer.clone());
            Ok(producer)
        }

        async fn close(&self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn build_router(client: Arc<RecordingClient>) -> (MessageRouter, StreamerMetrics) {
        let metrics = StreamerMetrics::new().expect("metrics should build");
        let router = MessageRouter::new(
            TopicMapper::default(),
            Arc::new(ProducerRegistry::new(client)),
            metrics.clone(),
            Arc::new(StreamerLifecycle::new()),
        );
        (router, metrics)
    }

    #[tokio::test]
    async fn route_forwards_payload_and_counts_once() {
        let client = Arc::new(RecordingClient::default());
        let (router, metrics) = build_router(client.clone());

        let outcome = router
            .route(InboundMessage::new("device/7/status", &b"ON"[..]))
            .await;

        let outbound_topic = "persistent://public/default/7/status";
        assert_eq!(
            outcome,
            RouteOutcome::Forwarded {
                outbound_topic: outbound_topic.to_string()
            }
        );
        let producer = client.producer(outbound_topic).expect("producer created");
        assert_eq!(
            *producer.sent.lock().expect("lock sent"),
            vec![Bytes::from_static(b"ON")]
        );
        assert_eq!(metrics.produced_count(outbound_topic), 1);
    }

    #[tokio::test]
    async fn route_drops_unmappable_topic_without_creating_producer() {
        let client = Arc::new(RecordingClient::default());
        let (router, metrics) = build_router(client.clone());

        let outcome = router.route(InboundMessage::new("device", &b"x"[..])).await;

        assert_eq!(outcome, RouteOutcome::TopicRejected);
        assert_eq!(client.create_count.load(Ordering::SeqCst), 0);
        assert!(metrics.snapshot().is_empty());
    }

    #[tokio::test]
    async fn route_reports_producer_unavailable_and_retries_next_time() {
        let client = Arc::new(RecordingClient::default());
        client.fail_create.store(true, Ordering::SeqCst);
        let (router, metrics) = build_router(client.clone());

        let first = router
            .route(InboundMessage::new("device/1/temp", &b"20"[..]))
            .await;
        assert!(matches!(first, RouteOutcome::ProducerUnavailable { .. }));

        client.fail_create.store(false, Ordering::SeqCst);
        let second = router
            .route(InboundMessage::new("device/1/temp", &b"21"[..]))
            .await;

        assert!(matches!(second, RouteOutcome::Forwarded { .. }));
        assert_eq!(client.create_count.load(Ordering::SeqCst), 2);
        assert_eq!(metrics.produced_count("persistent://public/default/1/temp"), 1);
    }

    #[tokio::test]
    async fn route_does_not_count_failed_sends_and_keeps_routing() {
        let client = Arc::new(RecordingClient {
            fail_send: true,
            ..Default::default()
        });
        let (router, metrics) = build_router(client.clone());

        let first = router
            .route(InboundMessage::new("device/1/temp", &b"20"[..]))
            .await;
        assert!(matches!(first, RouteOutcome::SendFailed { .. }));

        let producer = client
            .producer("persistent://public/default/1/temp")
            .expect("producer created");
        producer.fail_send.store(false, Ordering::SeqCst);
        let second = router
            .route(InboundMessage::new("device/1/temp", &b"21"[..]))
            .await;

        assert!(matches!(second, RouteOutcome::Forwarded { .. }));
        assert_eq!(client.create_count.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.produced_count("persistent://public/default/1/temp"), 1);
    }

    #[tokio::test]
    async fn route_refuses_messages_once_shutting_down() {
        let client = Arc::new(RecordingClient::default());
        let lifecycle = Arc::new(StreamerLifecycle::new());
        let router = MessageRouter::new(
            TopicMapper::default(),
            Arc::new(ProducerRegistry::new(client.clone())),
            StreamerMetrics::new().expect("metrics should build"),
            lifecycle.clone(),
        );

        lifecycle.begin_shutdown();
        let outcome = router
            .route(InboundMessage::new("device/1/temp", &b"20"[..]))
            .await;

        assert_eq!(outcome, RouteOutcome::ShuttingDown);
        assert_eq!(client.create_count.load(Ordering::SeqCst), 0);
    }
}
