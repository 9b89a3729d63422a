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

//! Two-state lifecycle shared by the router and the shutdown coordinator.

use std::sync::atomic::{AtomicU8, Ordering};

const RUNNING: u8 = 0;
const SHUTTING_DOWN: u8 = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LifecycleState {
    Running,
    /// Terminal; there is no way back to `Running`.
    ShuttingDown,
}

#[derive(Debug)]
pub struct StreamerLifecycle {
    state: AtomicU8,
}

impl StreamerLifecycle {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(RUNNING),
        }
    }

    pub fn state(&self) -> LifecycleState {
        match self.state.load(Ordering::Acquire) {
            RUNNING => LifecycleState::Running,
            _ => LifecycleState::ShuttingDown,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    /// Moves to `ShuttingDown`. Returns `true` only for the caller that made the transition.
    pub fn begin_shutdown(&self) -> bool {
        self.state
            .compare_exchange(RUNNING, SHUTTING_DOWN, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for StreamerLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
