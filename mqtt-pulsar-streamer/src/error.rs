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

//! Error types shared by the routing core and its transport adapters.

use thiserror::Error;

/// Coarse classification of a transport failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    Unavailable,
    Internal,
    InvalidArgument,
    Cancelled,
    NotFound,
}

/// Failure reported by an inbound or outbound transport capability.
///
/// `Clone` so a single producer-creation failure can be handed to every caller
/// that was waiting on the same creation.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{code:?}: {message}")]
pub struct TransportError {
    code: ErrorCode,
    message: String,
}

impl TransportError {
    pub fn fail_with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Inbound topic could not be translated into an outbound topic.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TopicMappingError {
    #[error("inbound topic `{topic}` has no segments after the first")]
    MissingRemainder { topic: String },
}

/// Producer registry lookup failures.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RegistryError {
    #[error("failed to create producer for topic `{topic}`: {source}")]
    CreationFailed {
        topic: String,
        #[source]
        source: TransportError,
    },
    #[error("producer registry is closed; refusing producer for topic `{topic}`")]
    Closed { topic: String },
}
