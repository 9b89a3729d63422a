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

use crate::error::StartupError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancels `token` on the first SIGINT or SIGTERM.
pub(crate) fn cancel_on_termination(token: CancellationToken) -> Result<(), StartupError> {
    #[cfg(unix)]
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .map_err(StartupError::Signal)?;

    tokio::spawn(async move {
        #[cfg(unix)]
        tokio::select! {
            interrupted = tokio::signal::ctrl_c() => log_interrupt(interrupted),
            _ = terminate.recv() => info!("Received SIGTERM"),
        }
        #[cfg(not(unix))]
        log_interrupt(tokio::signal::ctrl_c().await);

        token.cancel();
    });

    Ok(())
}

fn log_interrupt(result: std::io::Result<()>) {
    match result {
        Ok(()) => info!("Received SIGINT"),
        Err(e) => warn!(error = %e, "unable to listen for SIGINT, shutting down"),
    }
}
