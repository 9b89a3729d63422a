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
use mqtt_pulsar_streamer::{ErrorCode, TelemetryExporter, TransportError};
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct RecordingExporter {
    name: String,
    flush_count: AtomicUsize,
    stop_count: AtomicUsize,
    fail_flush: bool,
    fail_stop: bool,
    log: CallLog,
}

impl RecordingExporter {
    pub fn new(name: &str, log: CallLog) -> Self {
        Self {
            name: name.to_string(),
            flush_count: AtomicUsize::new(0),
            stop_count: AtomicUsize::new(0),
            fail_flush: false,
            fail_stop: false,
            log,
        }
    }

    pub fn with_failing_flush(mut self) -> Self {
        self.fail_flush = true;
        self
    }

    pub fn with_failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stop_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TelemetryExporter for RecordingExporter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn flush(&self) -> Result<(), TransportError> {
        self.flush_count.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("exporter.flush:{}", self.name));
        if self.fail_flush {
            return Err(TransportError::fail_with_code(
                ErrorCode::Internal,
                format!("{}: flush failed", self.name),
            ));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), TransportError> {
        self.stop_count.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("exporter.stop:{}", self.name));
        if self.fail_stop {
            return Err(TransportError::fail_with_code(
                ErrorCode::Internal,
                format!("{}: stop failed", self.name),
            ));
        }
        Ok(())
    }
}
