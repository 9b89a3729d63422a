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

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop the bridge before it reaches steady state.
#[derive(Debug, Error)]
pub(crate) enum StartupError {
    #[error("missing required setting `{0}`")]
    MissingSetting(&'static str),
    #[error("unable to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },
    #[error("invalid broker address `{0}`")]
    InvalidBrokerAddress(String),
    #[error("unable to connect to MQTT broker: {0}")]
    MqttConnect(String),
    #[error("unable to subscribe to `{topic}`: {reason}")]
    MqttSubscribe { topic: String, reason: String },
    #[error("unable to connect to Pulsar: {0}")]
    PulsarConnect(#[source] pulsar::Error),
    #[error("unable to bind metrics endpoint on {address}: {source}")]
    MetricsBind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("unable to create metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("unable to install signal handler: {0}")]
    Signal(#[source] io::Error),
}
