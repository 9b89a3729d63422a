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

use crate::control_plane::lifecycle::{LifecycleState, StreamerLifecycle};
use crate::control_plane::shutdown_coordinator::ShutdownCoordinator;
use crate::data_plane::message_router::MessageRouter;
use crate::data_plane::producer_registry::ProducerRegistry;
use crate::metrics::StreamerMetrics;
use crate::routing::topic_mapper::TopicMapper;
use crate::transport::{InboundListener, InboundSubscription, OutboundClient};
use std::sync::Arc;
use tracing::info;

const STREAMER_TAG: &str = "MqttPulsarStreamer:";

/// Owns the producer registry, router and lifecycle for one bridge instance.
///
/// Nothing here is global: two streamers in one process share no state.
pub struct MqttPulsarStreamer {
    name: String,
    lifecycle: Arc<StreamerLifecycle>,
    registry: Arc<ProducerRegistry>,
    router: Arc<MessageRouter>,
    outbound: Arc<dyn OutboundClient>,
    metrics: StreamerMetrics,
}

impl MqttPulsarStreamer {
    pub fn new(
        name: &str,
        outbound: Arc<dyn OutboundClient>,
        mapper: TopicMapper,
        metrics: StreamerMetrics,
    ) -> Self {
        let name = format!("{STREAMER_TAG}{name}");
        let lifecycle = Arc::new(StreamerLifecycle::new());
        let registry = Arc::new(ProducerRegistry::new(outbound.clone()));
        let router = Arc::new(MessageRouter::new(
            mapper.clone(),
            registry.clone(),
            metrics.clone(),
            lifecycle.clone(),
        ));

        info!(
            streamer = name.as_str(),
            namespace = mapper.namespace(),
            "streamer created"
        );

        Self {
            name,
            lifecycle,
            registry,
            router,
            outbound,
            metrics,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn router(&self) -> Arc<MessageRouter> {
        self.router.clone()
    }

    /// The router as the inbound transport sees it.
    pub fn listener(&self) -> Arc<dyn InboundListener> {
        self.router.clone()
    }

    pub fn registry(&self) -> Arc<ProducerRegistry> {
        self.registry.clone()
    }

    pub fn metrics(&self) -> &StreamerMetrics {
        &self.metrics
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Builds the coordinator that tears this streamer down together with `inbound`.
    pub fn shutdown_coordinator(
        &self,
        inbound: Arc<dyn InboundSubscription>,
    ) -> ShutdownCoordinator {
        ShutdownCoordinator::new(
            self.lifecycle.clone(),
            self.registry.clone(),
            inbound,
            self.outbound.clone(),
        )
    }
}
