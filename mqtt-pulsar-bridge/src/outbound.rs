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

//! Pulsar side of the bridge.

use crate::config::PulsarConfig;
use crate::error::StartupError;
use async_trait::async_trait;
use bytes::Bytes;
use mqtt_pulsar_streamer::{ErrorCode, OutboundClient, Producer, TransportError};
use pulsar::{Pulsar, TokioExecutor};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

const COMPONENT: &str = "pulsar_outbound";

fn unavailable(context: &str, error: pulsar::Error) -> TransportError {
    TransportError::fail_with_code(ErrorCode::Unavailable, format!("{context}: {error}"))
}

/// Owns the broker connection. `None` once closed; dropping the last handle
/// tears down the underlying connections.
pub(crate) struct PulsarOutbound {
    client: Mutex<Option<Pulsar<TokioExecutor>>>,
}

impl PulsarOutbound {
    pub(crate) async fn connect(config: &PulsarConfig) -> Result<Self, StartupError> {
        let client = Pulsar::builder(config.broker_url.clone(), TokioExecutor)
            .build()
            .await
            .map_err(StartupError::PulsarConnect)?;
        info!(
            component = COMPONENT,
            broker = config.broker_url.as_str(),
            "connected to Pulsar"
        );

        Ok(Self {
            client: Mutex::new(Some(client)),
        })
    }
}

#[async_trait]
impl OutboundClient for PulsarOutbound {
    async fn create_producer(&self, topic: &str) -> Result<Arc<dyn Producer>, TransportError> {
        // Clone out of the lock so creations for different topics run in parallel.
        let client = self.client.lock().await.clone().ok_or_else(|| {
            TransportError::fail_with_code(ErrorCode::Unavailable, "pulsar client is closed")
        })?;

        let producer = client
            .producer()
            .with_topic(topic)
            .build()
            .await
            .map_err(|e| unavailable("unable to create producer", e))?;
        debug!(component = COMPONENT, topic, "pulsar producer created");

        Ok(Arc::new(PulsarTopicProducer {
            topic: topic.to_string(),
            inner: Mutex::new(producer),
        }))
    }

    async fn close(&self) -> Result<(), TransportError> {
        match self.client.lock().await.take() {
            Some(_client) => {
                debug!(component = COMPONENT, "pulsar client released");
                Ok(())
            }
            None => Err(TransportError::fail_with_code(
                ErrorCode::NotFound,
                "pulsar client already closed",
            )),
        }
    }
}

struct PulsarTopicProducer {
    topic: String,
    inner: Mutex<pulsar::Producer<TokioExecutor>>,
}

#[async_trait]
impl Producer for PulsarTopicProducer {
    async fn send(&self, payload: Bytes) -> Result<(), TransportError> {
        // Only enqueueing needs exclusive access; the receipt is awaited unlocked.
        let receipt = {
            let mut producer = self.inner.lock().await;
            producer
                .send_non_blocking(payload.to_vec())
                .await
                .map_err(|e| unavailable(&format!("unable to send to {}", self.topic), e))?
        };

        receipt
            .await
            .map(|_| ())
            .map_err(|e| unavailable(&format!("no receipt from {}", self.topic), e))
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.inner
            .lock()
            .await
            .close()
            .await
            .map_err(|e| unavailable(&format!("unable to close producer for {}", self.topic), e))
    }
}
