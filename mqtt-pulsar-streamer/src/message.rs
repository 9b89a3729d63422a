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

use bytes::Bytes;

/// One message delivered by the inbound subscription.
///
/// The payload is opaque and forwarded byte-for-byte.
///
/// # Examples
///
/// ```
/// use mqtt_pulsar_streamer::InboundMessage;
///
/// let message = InboundMessage::new("device/7/status", &b"ON"[..]);
/// assert_eq!(message.topic(), "device/7/status");
/// assert_eq!(message.payload().as_ref(), b"ON");
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InboundMessage {
    topic: String,
    payload: Bytes,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}
