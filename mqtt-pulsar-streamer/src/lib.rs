/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
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

//! # mqtt-pulsar-streamer
//!
//! `mqtt-pulsar-streamer` republishes messages received on a wildcard MQTT
//! subscription onto Pulsar topics, one producer per outbound topic.
//!
//! The crate is the routing core only. Concrete brokers sit behind the
//! capability traits in [`transport`]; the `mqtt-pulsar-bridge` binary wires
//! in real clients.
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use mqtt_pulsar_streamer::{
//!     InboundMessage, MqttPulsarStreamer, OutboundClient, Producer, RouteOutcome,
//!     StreamerMetrics, TopicMapper, TransportError,
//! };
//!
//! # struct NoopProducer;
//! #
//! # #[async_trait]
//! # impl Producer for NoopProducer {
//! #     async fn send(&self, _payload: Bytes) -> Result<(), TransportError> { Ok(()) }
//! #     async fn close(&self) -> Result<(), TransportError> { Ok(()) }
//! # }
//! #
//! # struct NoopClient;
//! #
//! # #[async_trait]
//! # impl OutboundClient for NoopClient {
//! #     async fn create_producer(&self, _topic: &str) -> Result<Arc<dyn Producer>, TransportError> {
//! #         Ok(Arc::new(NoopProducer))
//! #     }
//! #     async fn close(&self) -> Result<(), TransportError> { Ok(()) }
//! # }
//! #
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let streamer = MqttPulsarStreamer::new(
//!     "quick-start",
//!     Arc::new(NoopClient),
//!     TopicMapper::default(),
//!     StreamerMetrics::new().unwrap(),
//! );
//!
//! let outcome = streamer
//!     .router()
//!     .route(InboundMessage::new("device/7/status", &b"ON"[..]))
//!     .await;
//! assert_eq!(
//!     outcome,
//!     RouteOutcome::Forwarded {
//!         outbound_topic: "persistent://public/default/7/status".to_string()
//!     }
//! );
//! assert_eq!(
//!     streamer
//!         .metrics()
//!         .produced_count("persistent://public/default/7/status"),
//!     1
//! );
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - Routing: inbound-to-outbound topic translation
//! - Data plane: producer registry and message router
//! - Control plane: lifecycle state and the shutdown sequence
//! - Runtime: one spawned task per inbound delivery
//!
//! ## Observability model
//!
//! Library code emits `tracing` events and spans and never initializes a
//! global subscriber. Binaries and tests own `tracing_subscriber` setup.

mod control_plane;
pub use control_plane::lifecycle::{LifecycleState, StreamerLifecycle};
pub use control_plane::shutdown_coordinator::{
    ShutdownCoordinator, ShutdownFailure, ShutdownReport, ShutdownStep,
    DEFAULT_INBOUND_DISCONNECT_TIMEOUT,
};

mod data_plane;
pub use data_plane::message_router::{MessageRouter, RouteOutcome};
pub use data_plane::producer_registry::{ProducerCloseSummary, ProducerRegistry};

mod error;
pub use error::{ErrorCode, RegistryError, TopicMappingError, TransportError};

mod message;
pub use message::InboundMessage;

mod metrics;
pub use metrics::{StreamerMetrics, MESSAGES_PRODUCED};

#[doc(hidden)]
pub mod observability;

mod routing;
pub use routing::topic_mapper::{TopicMapper, DEFAULT_OUTBOUND_NAMESPACE};

mod runtime;
pub use runtime::delivery::spawn_delivery;

mod streamer;
pub use streamer::MqttPulsarStreamer;

pub mod transport;
pub use transport::{
    InboundListener, InboundSubscription, OutboundClient, Producer, TelemetryExporter,
};
