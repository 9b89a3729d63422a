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

//! MQTT side of the bridge: connects, subscribes and feeds every publish to the router.

use crate::config::{parse_broker_address, MqttConfig};
use crate::error::StartupError;
use async_trait::async_trait;
use mqtt_pulsar_streamer::{
    spawn_delivery, ErrorCode, InboundListener, InboundMessage, InboundSubscription,
    TransportError,
};
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS,
    SubscribeReasonCode,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

const DEFAULT_MQTT_PORT: u16 = 1883;
const KEEP_ALIVE: Duration = Duration::from_secs(30);
const REQUEST_CHANNEL_CAPACITY: usize = 64;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

const COMPONENT: &str = "mqtt_subscription";

pub(crate) struct MqttSubscription {
    client: AsyncClient,
    event_loop_task: Mutex<Option<JoinHandle<()>>>,
    stop: CancellationToken,
}

impl MqttSubscription {
    /// Connects, waits for the subscription to be acknowledged and starts the event loop.
    pub(crate) async fn connect(
        config: &MqttConfig,
        listener: Arc<dyn InboundListener>,
    ) -> Result<Self, StartupError> {
        let (host, port) = parse_broker_address(&config.broker_url, DEFAULT_MQTT_PORT)?;
        let mut options = MqttOptions::new(config.client_id.clone(), host.clone(), port);
        options.set_keep_alive(KEEP_ALIVE);
        if let Some(username) = &config.username {
            options.set_credentials(username.clone(), config.password.clone().unwrap_or_default());
        }

        let (client, mut event_loop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);

        tokio::time::timeout(CONNECT_TIMEOUT, wait_for_connack(&mut event_loop))
            .await
            .map_err(|_| {
                StartupError::MqttConnect(format!("no CONNACK within {CONNECT_TIMEOUT:?}"))
            })??;
        info!(component = COMPONENT, host = host.as_str(), port, "connected to MQTT broker");

        client
            .subscribe(config.subscription.as_str(), QoS::AtMostOnce)
            .await
            .map_err(|e| StartupError::MqttSubscribe {
                topic: config.subscription.clone(),
                reason: e.to_string(),
            })?;
        tokio::time::timeout(
            CONNECT_TIMEOUT,
            wait_for_suback(&mut event_loop, &config.subscription, &listener),
        )
        .await
        .map_err(|_| StartupError::MqttSubscribe {
            topic: config.subscription.clone(),
            reason: format!("no SUBACK within {CONNECT_TIMEOUT:?}"),
        })??;
        info!(
            component = COMPONENT,
            subscription = config.subscription.as_str(),
            "subscribed"
        );

        let stop = CancellationToken::new();
        let task = tokio::spawn(run_event_loop(
            event_loop,
            client.clone(),
            config.subscription.clone(),
            listener,
            stop.clone(),
        ));

        Ok(Self {
            client,
            event_loop_task: Mutex::new(Some(task)),
            stop,
        })
    }
}

async fn wait_for_connack(event_loop: &mut EventLoop) -> Result<(), StartupError> {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return match ack.code {
                    ConnectReturnCode::Success => Ok(()),
                    refused => Err(StartupError::MqttConnect(format!(
                        "connection refused: {refused:?}"
                    ))),
                };
            }
            Ok(event) => trace!(component = COMPONENT, ?event, "waiting for CONNACK"),
            Err(e) => return Err(StartupError::MqttConnect(e.to_string())),
        }
    }
}

async fn wait_for_suback(
    event_loop: &mut EventLoop,
    subscription: &str,
    listener: &Arc<dyn InboundListener>,
) -> Result<(), StartupError> {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::SubAck(ack))) => {
                if ack
                    .return_codes
                    .iter()
                    .any(|code| matches!(code, SubscribeReasonCode::Failure))
                {
                    return Err(StartupError::MqttSubscribe {
                        topic: subscription.to_string(),
                        reason: "broker rejected the subscription".to_string(),
                    });
                }
                return Ok(());
            }
            // Retained messages may race the SUBACK.
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                spawn_delivery(
                    listener.clone(),
                    InboundMessage::new(publish.topic, publish.payload),
                );
            }
            Ok(event) => trace!(component = COMPONENT, ?event, "waiting for SUBACK"),
            Err(e) => {
                return Err(StartupError::MqttSubscribe {
                    topic: subscription.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

async fn run_event_loop(
    mut event_loop: EventLoop,
    client: AsyncClient,
    subscription: String,
    listener: Arc<dyn InboundListener>,
    stop: CancellationToken,
) {
    loop {
        let polled = tokio::select! {
            _ = stop.cancelled() => break,
            polled = event_loop.poll() => polled,
        };

        match polled {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                spawn_delivery(
                    listener.clone(),
                    InboundMessage::new(publish.topic, publish.payload),
                );
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!(component = COMPONENT, "disconnect sent, leaving event loop");
                break;
            }
            // A clean session loses the subscription on every reconnect.
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                warn!(
                    component = COMPONENT,
                    subscription = subscription.as_str(),
                    "reconnected to MQTT broker, resubscribing"
                );
                if let Err(e) = client.try_subscribe(subscription.as_str(), QoS::AtMostOnce) {
                    warn!(component = COMPONENT, error = %e, "unable to resubscribe");
                }
            }
            Ok(event) => trace!(component = COMPONENT, ?event, "mqtt event"),
            Err(e) => {
                warn!(component = COMPONENT, error = %e, "mqtt connection error, retrying");
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = tokio::time::sleep(RECONNECT_BACKOFF) => {}
                }
            }
        }
    }
}

#[async_trait]
impl InboundSubscription for MqttSubscription {
    async fn disconnect(&self, timeout: Duration) -> Result<(), TransportError> {
        let requested = self.client.disconnect().await;
        let task = self.event_loop_task.lock().await.take();

        let flushed = match task {
            Some(mut task) if requested.is_ok() => {
                tokio::time::timeout(timeout, &mut task).await.is_ok()
            }
            Some(task) => {
                task.abort();
                false
            }
            None => true,
        };
        self.stop.cancel();

        if let Err(e) = requested {
            return Err(TransportError::fail_with_code(
                ErrorCode::Unavailable,
                format!("unable to request MQTT disconnect: {e}"),
            ));
        }
        if !flushed {
            return Err(TransportError::fail_with_code(
                ErrorCode::Cancelled,
                format!("MQTT disconnect did not complete within {timeout:?}"),
            ));
        }
        Ok(())
    }
}
