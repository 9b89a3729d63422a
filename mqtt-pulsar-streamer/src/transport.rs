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

//! Capability seams between the routing core and the concrete transports.
//!
//! The core never talks to a broker directly. Binaries plug real clients in
//! behind these traits and tests plug in recording fakes.

use crate::error::TransportError;
use crate::message::InboundMessage;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

/// Publishing handle bound to exactly one outbound topic.
#[async_trait]
pub trait Producer: Send + Sync {
    /// Submits a payload; resolves once the outbound system acknowledged it.
    async fn send(&self, payload: Bytes) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

/// Connection to the outbound log-based messaging system.
#[async_trait]
pub trait OutboundClient: Send + Sync {
    async fn create_producer(&self, topic: &str) -> Result<Arc<dyn Producer>, TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

/// Live wildcard subscription on the inbound pub/sub broker.
#[async_trait]
pub trait InboundSubscription: Send + Sync {
    /// Best-effort disconnect that gives up after `timeout`.
    async fn disconnect(&self, timeout: Duration) -> Result<(), TransportError>;
}

/// Callback invoked once per delivered inbound message.
#[async_trait]
pub trait InboundListener: Send + Sync {
    async fn on_receive(&self, message: InboundMessage);
}

/// Profiling or metrics exporter that must be drained before exit.
#[async_trait]
pub trait TelemetryExporter: Send + Sync {
    fn name(&self) -> &str;

    async fn flush(&self) -> Result<(), TransportError>;

    async fn stop(&self) -> Result<(), TransportError>;
}
