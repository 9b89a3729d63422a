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

//! One spawned task per inbound delivery.

use crate::message::InboundMessage;
use crate::transport::InboundListener;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Hands `message` to `listener` on its own task so slow sends never block
/// the inbound transport's delivery loop.
pub fn spawn_delivery(
    listener: Arc<dyn InboundListener>,
    message: InboundMessage,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        listener.on_receive(message).await;
    })
}
