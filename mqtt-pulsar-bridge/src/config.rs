/********************************************************************************
 * Copyright (c) 2025 Contributors to the Eclipse Foundation
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

use crate::error::StartupError;
use clap::Parser;
use mqtt_pulsar_streamer::DEFAULT_OUTBOUND_NAMESPACE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MQTT_CLIENT_ID: &str = "mqtt-to-pulsar";
const DEFAULT_MQTT_SUBSCRIPTION: &str = "device/#";
const DEFAULT_DISCONNECT_TIMEOUT_MS: u64 = 250;

#[derive(Parser, Debug)]
#[command(about = "Republishes MQTT messages onto Pulsar topics")]
pub(crate) struct BridgeArgs {
    /// json5 config file; replaces every environment-provided setting.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long, env = "MQTT_BROKER_URL")]
    mqtt_broker_url: Option<String>,
    #[arg(long, env = "MQTT_CLIENT_ID")]
    mqtt_client_id: Option<String>,
    #[arg(long, env = "MQTT_USERNAME")]
    mqtt_username: Option<String>,
    #[arg(long, env = "MQTT_PASSWORD", hide_env_values = true)]
    mqtt_password: Option<String>,
    #[arg(long, env = "MQTT_SUBSCRIPTION", default_value = DEFAULT_MQTT_SUBSCRIPTION)]
    mqtt_subscription: String,
    #[arg(long, env = "MQTT_DISCONNECT_TIMEOUT_MS", default_value_t = DEFAULT_DISCONNECT_TIMEOUT_MS)]
    mqtt_disconnect_timeout_ms: u64,
    #[arg(long, env = "PULSAR_BROKER_URL")]
    pulsar_broker_url: Option<String>,
    #[arg(long, env = "PULSAR_NAMESPACE", default_value = DEFAULT_OUTBOUND_NAMESPACE)]
    pulsar_namespace: String,
    #[arg(long, env = "PROMETHEUS_PORT")]
    prometheus_port: Option<u16>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) mqtt: MqttConfig,
    pub(crate) pulsar: PulsarConfig,
    pub(crate) metrics: MetricsConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct MqttConfig {
    pub(crate) broker_url: String,
    #[serde(default = "default_client_id")]
    pub(crate) client_id: String,
    #[serde(default)]
    pub(crate) username: Option<String>,
    #[serde(default)]
    pub(crate) password: Option<String>,
    #[serde(default = "default_subscription")]
    pub(crate) subscription: String,
    #[serde(default = "default_disconnect_timeout_ms")]
    pub(crate) disconnect_timeout_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct PulsarConfig {
    pub(crate) broker_url: String,
    #[serde(default = "default_namespace")]
    pub(crate) namespace: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct MetricsConfig {
    pub(crate) port: u16,
}

fn default_client_id() -> String {
    DEFAULT_MQTT_CLIENT_ID.to_string()
}

fn default_subscription() -> String {
    DEFAULT_MQTT_SUBSCRIPTION.to_string()
}

fn default_disconnect_timeout_ms() -> u64 {
    DEFAULT_DISCONNECT_TIMEOUT_MS
}

fn default_namespace() -> String {
    DEFAULT_OUTBOUND_NAMESPACE.to_string()
}

impl Config {
    pub(crate) fn load(args: BridgeArgs) -> Result<Self, StartupError> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => Self::from_args(args),
        }
    }

    fn from_file(path: &PathBuf) -> Result<Self, StartupError> {
        let contents = std::fs::read_to_string(path).map_err(|source| StartupError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        Self::from_json5(&contents).map_err(|source| StartupError::ConfigParse {
            path: path.clone(),
            source,
        })
    }

    fn from_json5(contents: &str) -> Result<Self, json5::Error> {
        json5::from_str(contents)
    }

    fn from_args(args: BridgeArgs) -> Result<Self, StartupError> {
        Ok(Self {
            mqtt: MqttConfig {
                broker_url: args
                    .mqtt_broker_url
                    .ok_or(StartupError::MissingSetting("MQTT_BROKER_URL"))?,
                client_id: args.mqtt_client_id.unwrap_or_else(default_client_id),
                username: args.mqtt_username,
                password: args.mqtt_password,
                subscription: args.mqtt_subscription,
                disconnect_timeout_ms: args.mqtt_disconnect_timeout_ms,
            },
            pulsar: PulsarConfig {
                broker_url: args
                    .pulsar_broker_url
                    .ok_or(StartupError::MissingSetting("PULSAR_BROKER_URL"))?,
                namespace: args.pulsar_namespace,
            },
            metrics: MetricsConfig {
                port: args
                    .prometheus_port
                    .ok_or(StartupError::MissingSetting("PROMETHEUS_PORT"))?,
            },
        })
    }
}

impl MqttConfig {
    pub(crate) fn disconnect_timeout(&self) -> Duration {
        Duration::from_millis(self.disconnect_timeout_ms)
    }
}

/// Splits `tcp://host:port`, `mqtt://host:port` or `host:port` into its parts.
pub(crate) fn parse_broker_address(
    url: &str,
    default_port: u16,
) -> Result<(String, u16), StartupError> {
    let invalid = || StartupError::InvalidBrokerAddress(url.to_string());

    let authority = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = authority.trim_end_matches('/');
    if authority.is_empty() || authority.contains('/') {
        return Err(invalid());
    }

    match authority.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => {
            let port = port.parse::<u16>().map_err(|_| invalid())?;
            Ok((host.to_string(), port))
        }
        Some(_) => Err(invalid()),
        None => Ok((authority.to_string(), default_port)),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_broker_address, BridgeArgs, Config};
    use crate::error::StartupError;
    use clap::{CommandFactory, FromArgMatches};

    /// Parses `extra` with env lookups disabled so the caller's shell cannot leak in.
    fn args(extra: &[&str]) -> BridgeArgs {
        let mut argv = vec!["mqtt-pulsar-bridge"];
        argv.extend_from_slice(extra);
        let matches = BridgeArgs::command()
            .mut_args(|arg| arg.env(None))
            .try_get_matches_from(argv)
            .expect("arguments should parse");
        BridgeArgs::from_arg_matches(&matches).expect("matches should convert")
    }

    #[test]
    fn from_args_builds_config_with_defaults() {
        let config = Config::load(args(&[
            "--mqtt-broker-url",
            "tcp://broker:1883",
            "--pulsar-broker-url",
            "pulsar://pulsar:6650",
            "--prometheus-port",
            "9100",
        ]))
        .expect("config should load");

        assert_eq!(config.mqtt.broker_url, "tcp://broker:1883");
        assert_eq!(config.mqtt.subscription, "device/#");
        assert_eq!(config.mqtt.disconnect_timeout_ms, 250);
        assert_eq!(config.pulsar.namespace, "persistent://public/default");
        assert_eq!(config.metrics.port, 9100);
    }

    #[test]
    fn from_args_reports_missing_setting() {
        let loaded = Config::load(args(&[
            "--mqtt-broker-url",
            "tcp://broker:1883",
            "--prometheus-port",
            "9100",
        ]));

        assert!(matches!(
            loaded,
            Err(StartupError::MissingSetting("PULSAR_BROKER_URL"))
        ));
    }

    #[test]
    fn args_ignore_process_environment() {
        std::env::set_var("MQTT_CLIENT_ID", "from-environment");

        let loaded = Config::load(args(&[
            "--mqtt-broker-url",
            "tcp://broker:1883",
            "--pulsar-broker-url",
            "pulsar://pulsar:6650",
            "--prometheus-port",
            "9100",
        ]));
        std::env::remove_var("MQTT_CLIENT_ID");

        let config = loaded.expect("config should load");
        assert_eq!(config.mqtt.client_id, "mqtt-to-pulsar");
    }

    #[test]
    fn from_json5_fills_optional_fields() {
        let config = Config::from_json5(
            r#"{
                // trailing commas and comments are accepted
                mqtt: { broker_url: "mqtt://broker", },
                pulsar: { broker_url: "pulsar://pulsar:6650", namespace: "persistent://iot/raw" },
                metrics: { port: 9200 },
            }"#,
        )
        .expect("config should parse");

        assert_eq!(config.mqtt.client_id, "mqtt-to-pulsar");
        assert_eq!(config.mqtt.username, None);
        assert_eq!(config.pulsar.namespace, "persistent://iot/raw");
        assert_eq!(config.metrics.port, 9200);
    }

    #[test]
    fn from_json5_rejects_unknown_fields() {
        let parsed = Config::from_json5(
            r#"{
                mqtt: { broker_url: "mqtt://broker", qos: 1 },
                pulsar: { broker_url: "pulsar://pulsar:6650" },
                metrics: { port: 9200 },
            }"#,
        );

        assert!(parsed.is_err());
    }

    #[test]
    fn parse_broker_address_accepts_common_forms() {
        assert_eq!(
            parse_broker_address("tcp://broker:1884", 1883).expect("tcp form"),
            ("broker".to_string(), 1884)
        );
        assert_eq!(
            parse_broker_address("mqtt://broker", 1883).expect("no port"),
            ("broker".to_string(), 1883)
        );
        assert_eq!(
            parse_broker_address("10.0.0.5:1883/", 1883).expect("bare form"),
            ("10.0.0.5".to_string(), 1883)
        );
    }

    #[test]
    fn parse_broker_address_rejects_malformed_input() {
        for url in ["", "tcp://", "tcp://broker:port", "tcp://:1883", "tcp://broker/path"] {
            assert!(
                matches!(
                    parse_broker_address(url, 1883),
                    Err(StartupError::InvalidBrokerAddress(_))
                ),
                "{url} should be rejected"
            );
        }
    }
}
