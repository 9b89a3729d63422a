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

//! Per-topic produced-message counters exposed in Prometheus text format.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

pub const MESSAGES_PRODUCED: &str = "messages_produced";
const MESSAGES_PRODUCED_HELP: &str = "Number of messages produced to Pulsar";
const TOPIC_LABEL: &str = "topic";

/// Process-wide counters owned explicitly instead of living in a global registry.
#[derive(Clone)]
pub struct StreamerMetrics {
    registry: Registry,
    messages_produced: IntCounterVec,
}

impl StreamerMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let messages_produced = IntCounterVec::new(
            Opts::new(MESSAGES_PRODUCED, MESSAGES_PRODUCED_HELP),
            &[TOPIC_LABEL],
        )?;
        registry.register(Box::new(messages_produced.clone()))?;

        Ok(Self {
            registry,
            messages_produced,
        })
    }

    /// Counts one successfully forwarded message for `outbound_topic`.
    pub fn record_produced(&self, outbound_topic: &str) {
        self.messages_produced
            .with_label_values(&[outbound_topic])
            .inc();
    }

    pub fn produced_count(&self, outbound_topic: &str) -> u64 {
        self.snapshot()
            .into_iter()
            .find_map(|(topic, count)| (topic == outbound_topic).then_some(count))
            .unwrap_or(0)
    }

    /// Current `(topic, count)` pairs, sorted by topic.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let mut counts: Vec<(String, u64)> = self
            .registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == MESSAGES_PRODUCED)
            .flat_map(|family| family.get_metric())
            .filter_map(|metric| {
                let topic = metric
                    .get_label()
                    .iter()
                    .find(|label| label.get_name() == TOPIC_LABEL)?
                    .get_value()
                    .to_string();
                Some((topic, metric.get_counter().get_value() as u64))
            })
            .collect();
        counts.sort();
        counts
    }

    pub fn encode_text(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}
