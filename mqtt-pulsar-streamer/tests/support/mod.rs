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

use integration_test_utils::{CallLog, RecordingOutboundClient};
use mqtt_pulsar_streamer::{MqttPulsarStreamer, StreamerMetrics, TopicMapper};
use std::sync::Arc;

pub(crate) fn make_streamer(name: &str, client: Arc<RecordingOutboundClient>) -> MqttPulsarStreamer {
    MqttPulsarStreamer::new(
        name,
        client,
        TopicMapper::default(),
        StreamerMetrics::new().expect("metrics creation should succeed"),
    )
}

pub(crate) fn recording_client(log: &CallLog) -> Arc<RecordingOutboundClient> {
    Arc::new(RecordingOutboundClient::new(log.clone()))
}
