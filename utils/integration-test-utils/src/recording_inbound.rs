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
use mqtt_pulsar_streamer::{ErrorCode, InboundSubscription, TransportError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct RecordingSubscription {
    disconnect_count: AtomicUsize,
    last_timeout: Mutex<Option<Duration>>,
    fail_disconnect: bool,
    log: CallLog,
}

impl RecordingSubscription {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn with_failing_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnect_count.load(Ordering::SeqCst)
    }

    pub fn last_timeout(&self) -> Option<Duration> {
        *self.last_timeout.lock().expect("lock last_timeout")
    }
}

#[async_trait]
impl InboundSubscription for RecordingSubscription {
    async fn disconnect(&self, timeout: Duration) -> Result<(), TransportError> {
        self.disconnect_count.fetch_add(1, Ordering::SeqCst);
        *self.last_timeout.lock().expect("lock last_timeout") = Some(timeout);
        self.log.push("inbound.disconnect");
        if self.fail_disconnect {
            Err(TransportError::fail_with_code(
                ErrorCode::Unavailable,
                "inbound disconnect failed",
            ))
        } else {
            Ok(())
        }
    }
}
