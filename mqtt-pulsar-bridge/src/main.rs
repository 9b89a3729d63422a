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

mod config;
mod error;
mod inbound;
mod metrics_server;
mod outbound;
mod signals;

use crate::config::{BridgeArgs, Config};
use crate::error::StartupError;
use crate::inbound::MqttSubscription;
use crate::metrics_server::MetricsServer;
use crate::outbound::PulsarOutbound;
use clap::Parser;
use mqtt_pulsar_streamer::{MqttPulsarStreamer, StreamerMetrics, TopicMapper};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let dotenv = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => info!("no .env file, using process environment"),
        Err(e) => warn!(error = %e, "unable to load .env file"),
    }
    info!("Started mqtt-pulsar-bridge");

    let config = Config::load(BridgeArgs::parse())?;

    let metrics = StreamerMetrics::new()?;
    let outbound = Arc::new(PulsarOutbound::connect(&config.pulsar).await?);

    let streamer = MqttPulsarStreamer::new(
        "mqtt-pulsar-bridge",
        outbound,
        TopicMapper::new(&config.pulsar.namespace),
        metrics.clone(),
    );

    let metrics_server = Arc::new(MetricsServer::start(config.metrics.port, metrics).await?);
    let inbound = Arc::new(MqttSubscription::connect(&config.mqtt, streamer.listener()).await?);

    let lifetime = CancellationToken::new();
    signals::cancel_on_termination(lifetime.clone())?;

    let report = streamer
        .shutdown_coordinator(inbound)
        .with_exporter(metrics_server)
        .with_inbound_disconnect_timeout(config.mqtt.disconnect_timeout())
        .shutdown_on(lifetime.cancelled())
        .await;

    if report.is_clean() {
        info!(
            producers = report.producers_attempted,
            "mqtt-pulsar-bridge stopped"
        );
    } else {
        for failure in &report.failures {
            warn!(
                step = ?failure.step,
                target = failure.target.as_str(),
                error = %failure.error,
                "shutdown step failed"
            );
        }
        warn!(
            producers = report.producers_attempted,
            failures = report.failures.len(),
            "mqtt-pulsar-bridge stopped with errors"
        );
    }

    Ok(())
}
