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

//! Prometheus scrape endpoint, stopped as the last step of shutdown.

use crate::error::StartupError;
use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use mqtt_pulsar_streamer::{ErrorCode, StreamerMetrics, TelemetryExporter, TransportError};
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

const METRICS_PATH: &str = "/metrics";
const EXPORTER_NAME: &str = "prometheus";

pub(crate) struct MetricsServer {
    local_addr: SocketAddr,
    metrics: StreamerMetrics,
    shutdown: CancellationToken,
    task: Mutex<Option<JoinHandle<io::Result<()>>>>,
}

impl MetricsServer {
    pub(crate) async fn start(port: u16, metrics: StreamerMetrics) -> Result<Self, StartupError> {
        let address = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| StartupError::MetricsBind { address, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| StartupError::MetricsBind { address, source })?;

        let app = Router::new()
            .route(METRICS_PATH, get(serve_metrics))
            .with_state(metrics.clone());

        let shutdown = CancellationToken::new();
        let stopped = shutdown.clone();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { stopped.cancelled().await })
                .await
        });

        info!(
            "Starting Prometheus metrics at http://localhost:{}{METRICS_PATH}",
            local_addr.port()
        );

        Ok(Self {
            local_addr,
            metrics,
            shutdown,
            task: Mutex::new(Some(task)),
        })
    }

    #[cfg(test)]
    pub(crate) fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

async fn serve_metrics(State(metrics): State<StreamerMetrics>) -> Response {
    match metrics.encode_text() {
        Ok(body) => ([(header::CONTENT_TYPE, metrics.content_type())], body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

#[async_trait]
impl TelemetryExporter for MetricsServer {
    fn name(&self) -> &str {
        EXPORTER_NAME
    }

    /// Scrapes are pull-based, so flushing logs the final counts instead.
    async fn flush(&self) -> Result<(), TransportError> {
        let snapshot = self.metrics.snapshot();
        let total: u64 = snapshot.iter().map(|(_, count)| count).sum();
        info!(
            exporter = EXPORTER_NAME,
            topics = snapshot.len(),
            total,
            "final produced counts"
        );
        for (topic, count) in snapshot {
            info!(exporter = EXPORTER_NAME, topic, count, "produced");
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), TransportError> {
        self.shutdown.cancel();
        let Some(task) = self.task.lock().await.take() else {
            return Ok(());
        };

        match task.await {
            Ok(Ok(())) => {
                info!(address = %self.local_addr, "metrics endpoint stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(TransportError::fail_with_code(
                ErrorCode::Internal,
                format!("metrics server failed: {e}"),
            )),
            Err(e) => Err(TransportError::fail_with_code(
                ErrorCode::Internal,
                format!("metrics server task failed: {e}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MetricsServer;
    use mqtt_pulsar_streamer::{StreamerMetrics, TelemetryExporter};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn scrape(server: &MetricsServer, path: &str) -> String {
        let mut stream = TcpStream::connect(server.local_addr())
            .await
            .expect("metrics endpoint should accept connections");
        let request =
            format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream
            .write_all(request.as_bytes())
            .await
            .expect("request should be written");

        let mut response = String::new();
        stream
            .read_to_string(&mut response)
            .await
            .expect("response should be readable");
        response
    }

    #[tokio::test]
    async fn serves_produced_counts() {
        let metrics = StreamerMetrics::new().expect("metrics should build");
        metrics.record_produced("persistent://public/default/7/status");
        let server = MetricsServer::start(0, metrics)
            .await
            .expect("server should start");

        let response = scrape(&server, "/metrics").await;

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("text/plain"));
        assert!(response
            .contains("messages_produced{topic=\"persistent://public/default/7/status\"} 1"));

        server.stop().await.expect("server should stop");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let metrics = StreamerMetrics::new().expect("metrics should build");
        let server = MetricsServer::start(0, metrics)
            .await
            .expect("server should start");

        let response = scrape(&server, "/healthz").await;

        assert!(response.starts_with("HTTP/1.1 404"));
        server.stop().await.expect("server should stop");
    }

    #[tokio::test]
    async fn stop_closes_listener_and_is_repeatable() {
        let metrics = StreamerMetrics::new().expect("metrics should build");
        let server = MetricsServer::start(0, metrics)
            .await
            .expect("server should start");
        let address = server.local_addr();

        server.flush().await.expect("flush should succeed");
        server.stop().await.expect("server should stop");
        server.stop().await.expect("second stop is a no-op");

        assert!(tokio::net::TcpStream::connect(address).await.is_err());
    }
}
