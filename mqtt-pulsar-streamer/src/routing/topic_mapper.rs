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

//! Inbound-to-outbound topic name translation.

use crate::error::TopicMappingError;

/// Namespace prefix used when none is configured.
pub const DEFAULT_OUTBOUND_NAMESPACE: &str = "persistent://public/default";

const TOPIC_DELIMITER: char = '/';

/// Maps inbound topics onto the outbound namespace.
///
/// The first inbound segment is discarded and the remaining segments are
/// re-joined under the namespace prefix. A topic with nothing after its
/// first segment (`device`, `device/`) is rejected.
///
/// # Examples
///
/// ```
/// use mqtt_pulsar_streamer::TopicMapper;
///
/// let mapper = TopicMapper::default();
/// assert_eq!(
///     mapper.map("device/123/temp").unwrap(),
///     "persistent://public/default/123/temp"
/// );
/// assert!(mapper.map("device").is_err());
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicMapper {
    namespace: String,
}

impl TopicMapper {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace: String = namespace.into();
        Self {
            namespace: namespace.trim_end_matches(TOPIC_DELIMITER).to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn map(&self, inbound_topic: &str) -> Result<String, TopicMappingError> {
        let remainder = match inbound_topic.split_once(TOPIC_DELIMITER) {
            Some((_, remainder)) if !remainder.is_empty() => remainder,
            _ => {
                return Err(TopicMappingError::MissingRemainder {
                    topic: inbound_topic.to_string(),
                })
            }
        };

        Ok(format!("{}{TOPIC_DELIMITER}{remainder}", self.namespace))
    }
}

impl Default for TopicMapper {
    fn default() -> Self {
        Self::new(DEFAULT_OUTBOUND_NAMESPACE)
    }
}
