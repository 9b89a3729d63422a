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

//! Ordered, best-effort shutdown of producers, transports and exporters.

use crate::control_plane::lifecycle::StreamerLifecycle;
use crate::data_plane::producer_registry::ProducerRegistry;
use crate::error::TransportError;
use crate::observability::events;
use crate::transport::{InboundSubscription, OutboundClient, TelemetryExporter};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const COMPONENT: &str = "shutdown_coordinator";

/// Default bound on the inbound disconnect.
pub const DEFAULT_INBOUND_DISCONNECT_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShutdownStep {
    CloseProducer,
    DisconnectInbound,
    CloseOutbound,
    FlushExporter,
    StopExporter,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShutdownFailure {
    pub step: ShutdownStep,
    pub target: String,
    pub error: TransportError,
}

/// Result of one shutdown run. Failures are collected, never raised.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ShutdownReport {
    /// `true` when another caller had already started shutdown.
    pub skipped: bool,
    pub producers_attempted: usize,
    pub failures: Vec<ShutdownFailure>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, step: ShutdownStep, target: impl Into<String>, error: TransportError) {
        self.failures.push(ShutdownFailure {
            step,
            target: target.into(),
            error,
        });
    }
}

pub struct ShutdownCoordinator {
    lifecycle: Arc<StreamerLifecycle>,
    registry: Arc<ProducerRegistry>,
    inbound: Arc<dyn InboundSubscription>,
    outbound: Arc<dyn OutboundClient>,
    exporters: Vec<Arc<dyn TelemetryExporter>>,
    inbound_disconnect_timeout: Duration,
}

impl ShutdownCoordinator {
    pub fn new(
        lifecycle: Arc<StreamerLifecycle>,
        registry: Arc<ProducerRegistry>,
        inbound: Arc<dyn InboundSubscription>,
        outbound: Arc<dyn OutboundClient>,
    ) -> Self {
        Self {
            lifecycle,
            registry,
            inbound,
            outbound,
            exporters: Vec::new(),
            inbound_disconnect_timeout: DEFAULT_INBOUND_DISCONNECT_TIMEOUT,
        }
    }

    pub fn with_exporter(mut self, exporter: Arc<dyn TelemetryExporter>) -> Self {
        self.exporters.push(exporter);
        self
    }

    pub fn with_inbound_disconnect_timeout(mut self, timeout: Duration) -> Self {
        self.inbound_disconnect_timeout = timeout;
        self
    }

    /// Waits for `signal` to resolve, then runs [`ShutdownCoordinator::shutdown`].
    pub async fn shutdown_on<F>(&self, signal: F) -> ShutdownReport
    where
        F: Future<Output = ()>,
    {
        signal.await;
        self.shutdown().await
    }

    /// Leaves `Running` and releases everything in order:
    /// producers, inbound subscription, outbound client, then exporters.
    pub async fn shutdown(&self) -> ShutdownReport {
        if !self.lifecycle.begin_shutdown() {
            debug!(
                event = events::SHUTDOWN_ALREADY_STARTED,
                component = COMPONENT,
                "shutdown already started"
            );
            return ShutdownReport {
                skipped: true,
                ..Default::default()
            };
        }

        info!(
            event = events::SHUTDOWN_START,
            component = COMPONENT,
            "starting graceful shutdown"
        );
        let mut report = ShutdownReport::default();

        let producers = self.registry.close_all().await;
        report.producers_attempted = producers.attempted();
        info!(
            event = events::SHUTDOWN_PRODUCERS_CLOSED,
            component = COMPONENT,
            closed = producers.closed.len(),
            failed = producers.failed.len(),
            "closed producers"
        );
        for (topic, error) in producers.failed {
            report.record(ShutdownStep::CloseProducer, topic, error);
        }

        match self.inbound.disconnect(self.inbound_disconnect_timeout).await {
            Ok(()) => debug!(
                event = events::SHUTDOWN_INBOUND_DISCONNECT_OK,
                component = COMPONENT,
                "disconnected inbound subscription"
            ),
            Err(err) => {
                warn!(
                    event = events::SHUTDOWN_INBOUND_DISCONNECT_FAILED,
                    component = COMPONENT,
                    err = %err,
                    "unable to disconnect inbound subscription"
                );
                report.record(ShutdownStep::DisconnectInbound, "inbound", err);
            }
        }

        match self.outbound.close().await {
            Ok(()) => debug!(
                event = events::SHUTDOWN_OUTBOUND_CLOSE_OK,
                component = COMPONENT,
                "closed outbound client"
            ),
            Err(err) => {
                warn!(
                    event = events::SHUTDOWN_OUTBOUND_CLOSE_FAILED,
                    component = COMPONENT,
                    err = %err,
                    "unable to close outbound client"
                );
                report.record(ShutdownStep::CloseOutbound, "outbound", err);
            }
        }

        for exporter in &self.exporters {
            let name = exporter.name();
            if let Err(err) = exporter.flush().await {
                warn!(
                    event = events::SHUTDOWN_EXPORTER_FLUSH_FAILED,
                    component = COMPONENT,
                    exporter = name,
                    err = %err,
                    "unable to flush exporter"
                );
                report.record(ShutdownStep::FlushExporter, name, err);
            }

            match exporter.stop().await {
                Ok(()) => debug!(
                    event = events::SHUTDOWN_EXPORTER_STOP_OK,
                    component = COMPONENT,
                    exporter = name,
                    "stopped exporter"
                ),
                Err(err) => {
                    warn!(
                        event = events::SHUTDOWN_EXPORTER_STOP_FAILED,
                        component = COMPONENT,
                        exporter = name,
                        err = %err,
                        "unable to stop exporter"
                    );
                    report.record(ShutdownStep::StopExporter, name, err);
                }
            }
        }

        info!(
            event = events::SHUTDOWN_COMPLETE,
            component = COMPONENT,
            failures = report.failures.len(),
            "graceful shutdown completed"
        );
        report
    }
}
