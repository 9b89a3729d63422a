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

use crate::call_log::CallLog;
use async_trait::async_trait;
use bytes::Bytes;
use mqtt_pulsar_streamer::{ErrorCode, OutboundClient, Producer, TransportError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

pub struct RecordingProducer {
    topic: String,
    sent: Mutex<Vec<Bytes>>,
    close_count: AtomicUsize,
    fail_send: AtomicBool,
    fail_close: bool,
    log: CallLog,
}

impl RecordingProducer {
    fn new(topic: &str, fail_close: bool, log: CallLog) -> Self {
        Self {
            topic: topic.to_string(),
            sent: Mutex::new(Vec::new()),
            close_count: AtomicUsize::new(0),
            fail_send: AtomicBool::new(false),
            fail_close,
            log,
        }
    }

    pub fn sent(&self) -> Vec<Bytes> {
        self.sent.lock().expect("lock sent").clone()
    }

    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    pub fn set_fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Producer for RecordingProducer {
    async fn send(&self, payload: Bytes) -> Result<(), TransportError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(TransportError::fail_with_code(
                ErrorCode::Unavailable,
                format!("{}: send rejected", self.topic),
            ));
        }
        debug!("{}: sending {} bytes", self.topic, payload.len());
        self.sent.lock().expect("lock sent").push(payload);
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("producer.close:{}", self.topic));
        if self.fail_close {
            Err(TransportError::fail_with_code(
                ErrorCode::Internal,
                format!("{}: close failed", self.topic),
            ))
        } else {
            Ok(())
        }
    }
}

/// Outbound client fake that records producer creations and can inject failures.
#[derive(Default)]
pub struct RecordingOutboundClient {
    producers: Mutex<HashMap<String, Vec<Arc<RecordingProducer>>>>,
    create_count: AtomicUsize,
    close_count: AtomicUsize,
    failing_creations: AtomicUsize,
    create_delay: Option<Duration>,
    fail_close: bool,
    fail_producer_close: HashSet<String>,
    log: CallLog,
}

impl RecordingOutboundClient {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    pub fn with_failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn with_failing_producer_close(mut self, topic: &str) -> Self {
        self.fail_producer_close.insert(topic.to_string());
        self
    }

    /// The next `count` creations fail.
    pub fn fail_next_creations(&self, count: usize) {
        self.failing_creations.store(count, Ordering::SeqCst);
    }

    pub fn create_count(&self) -> usize {
        self.create_count.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    /// Every producer created for `topic`, oldest first.
    pub fn producers_for(&self, topic: &str) -> Vec<Arc<RecordingProducer>> {
        self.producers
            .lock()
            .expect("lock producers")
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    pub fn all_producers(&self) -> Vec<Arc<RecordingProducer>> {
        self.producers
            .lock()
            .expect("lock producers")
            .values()
            .flatten()
            .cloned()
            .collect()
    }

    fn take_failure(&self) -> bool {
        self.failing_creations
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl OutboundClient for RecordingOutboundClient {
    async fn create_producer(&self, topic: &str) -> Result<Arc<dyn Producer>, TransportError> {
        self.create_count.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("client.create:{topic}"));
        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }

        if self.take_failure() {
            return Err(TransportError::fail_with_code(
                ErrorCode::Unavailable,
                format!("unable to create producer for {topic}"),
            ));
        }

        let producer = Arc::new(RecordingProducer::new(
            topic,
            self.fail_producer_close.contains(topic),
            self.log.clone(),
        ));
        self.producers
            .lock()
            .expect("lock producers")
            .entry(topic.to_string())
            .or_default()
            .push(producer.clone());
        Ok(producer)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        self.log.push("client.close");
        if self.fail_close {
            Err(TransportError::fail_with_code(
                ErrorCode::Internal,
                "outbound close failed",
            ))
        } else {
            Ok(())
        }
    }
}
