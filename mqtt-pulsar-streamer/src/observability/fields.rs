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

//! Canonical structured field values and value-format helpers.

use bytes::Bytes;

pub const NONE: &str = "none";
pub const REASON_REGISTRY_CLOSED: &str = "registry_closed";
pub const REASON_MISSING_REMAINDER: &str = "missing_topic_remainder";

const PAYLOAD_PREVIEW_MAX_BYTES: usize = 32;

/// Short printable preview of a payload for debug events.
pub fn format_payload_preview(payload: &Bytes) -> String {
    if payload.is_empty() {
        return NONE.to_string();
    }

    let shown = &payload[..payload.len().min(PAYLOAD_PREVIEW_MAX_BYTES)];
    let mut preview = String::from_utf8_lossy(shown).into_owned();
    if payload.len() > PAYLOAD_PREVIEW_MAX_BYTES {
        preview.push_str("...");
    }
    preview
}
