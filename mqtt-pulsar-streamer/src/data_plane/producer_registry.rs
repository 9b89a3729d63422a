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

//! Registry of outbound producers keyed by outbound topic.
//!
//! Producers are created lazily on first use. Concurrent first access to the
//! same topic shares one creation: every caller observes the same producer or
//! the same failure. Failures are never cached.

use crate::error::{RegistryError, TransportError};
use crate::observability::events;
use crate::transport::{OutboundClient, Producer};
use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const COMPONENT: &str = "producer_registry";

type CreationResult = Result<Arc<dyn Producer>, TransportError>;
type PendingCreation = Shared<BoxFuture<'static, CreationResult>>;

enum ProducerSlot {
    Ready(Arc<dyn Producer>),
    Pending {
        creation_id: u64,
        creation: PendingCreation,
    },
}

#[derive(Default)]
struct RegistryState {
    slots: HashMap<String, ProducerSlot>,
    closed: bool,
    next_creation_id: u64,
}

/// Outcome of closing every registered producer.
#[derive(Debug, Default)]
pub struct ProducerCloseSummary {
    pub closed: Vec<String>,
    pub failed: Vec<(String, TransportError)>,
}

impl ProducerCloseSummary {
    pub fn attempted(&self) -> usize {
        self.closed.len() + self.failed.len()
    }
}

pub struct ProducerRegistry {
    client: Arc<dyn OutboundClient>,
    state: Mutex<RegistryState>,
}

impl ProducerRegistry {
    pub fn new(client: Arc<dyn OutboundClient>) -> Self {
        Self {
            client,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Returns the producer for `topic`, creating it on first access.
    pub async fn get_or_create(&self, topic: &str) -> Result<Arc<dyn Producer>, RegistryError> {
        let (creation_id, creation) = {
            let mut state = self.state.lock().await;
            if state.closed {
                return Err(RegistryError::Closed {
                    topic: topic.to_string(),
                });
            }

            match state.slots.get(topic) {
                Some(ProducerSlot::Ready(producer)) => return Ok(producer.clone()),
                Some(ProducerSlot::Pending {
                    creation_id,
                    creation,
                }) => (*creation_id, creation.clone()),
                None => {
                    let creation_id = state.next_creation_id;
                    state.next_creation_id += 1;
                    let creation = self.start_creation(topic);
                    state.slots.insert(
                        topic.to_string(),
                        ProducerSlot::Pending {
                            creation_id,
                            creation: creation.clone(),
                        },
                    );
                    (creation_id, creation)
                }
            }
        };

        let outcome = creation.await;

        let mut state = self.state.lock().await;
        let owns_slot = matches!(
            state.slots.get(topic),
            Some(ProducerSlot::Pending { creation_id: current, .. }) if *current == creation_id
        );

        match outcome {
            // `close_all` took the slot and closes this producer itself.
            Ok(_) if state.closed => Err(RegistryError::Closed {
                topic: topic.to_string(),
            }),
            Ok(producer) => {
                if owns_slot {
                    state
                        .slots
                        .insert(topic.to_string(), ProducerSlot::Ready(producer.clone()));
                }
                Ok(producer)
            }
            Err(source) => {
                if owns_slot {
                    state.slots.remove(topic);
                }
                Err(RegistryError::CreationFailed {
                    topic: topic.to_string(),
                    source,
                })
            }
        }
    }

    fn start_creation(&self, topic: &str) -> PendingCreation {
        let client = self.client.clone();
        let topic = topic.to_string();

        async move {
            debug!(
                event = events::PRODUCER_CREATE_START,
                component = COMPONENT,
                outbound_topic = topic.as_str(),
                "creating producer"
            );
            let created = client.create_producer(&topic).await;
            match &created {
                Ok(_) => info!(
                    event = events::PRODUCER_CREATE_OK,
                    component = COMPONENT,
                    outbound_topic = topic.as_str(),
                    "created producer"
                ),
                Err(err) => warn!(
                    event = events::PRODUCER_CREATE_FAILED,
                    component = COMPONENT,
                    outbound_topic = topic.as_str(),
                    err = %err,
                    "failed to create producer"
                ),
            }
            created
        }
        .boxed()
        .shared()
    }

    /// Number of live producers.
    pub async fn len(&self) -> usize {
        self.state
            .lock()
            .await
            .slots
            .values()
            .filter(|slot| matches!(slot, ProducerSlot::Ready(_)))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    /// Closes the registry to new creations and closes every producer once.
    ///
    /// Creations still in flight are awaited here and their producers closed
    /// alongside the live ones, so nothing is left open once this returns.
    /// Every close is attempted even when others fail.
    pub async fn close_all(&self) -> ProducerCloseSummary {
        let slots = {
            let mut state = self.state.lock().await;
            state.closed = true;
            std::mem::take(&mut state.slots)
        };

        let results = join_all(slots.into_iter().map(|(topic, slot)| async move {
            let producer = match slot {
                ProducerSlot::Ready(producer) => producer,
                ProducerSlot::Pending { creation, .. } => match creation.await {
                    Ok(producer) => {
                        debug!(
                            event = events::PRODUCER_CREATE_AFTER_CLOSE,
                            component = COMPONENT,
                            outbound_topic = topic.as_str(),
                            "closing producer created during shutdown"
                        );
                        producer
                    }
                    // The creation already logged its failure; nothing to close.
                    Err(_) => return None,
                },
            };
            let closed = producer.close().await;
            Some((topic, closed))
        }))
        .await;

        let mut summary = ProducerCloseSummary::default();
        for (topic, closed) in results.into_iter().flatten() {
            match closed {
                Ok(()) => {
                    debug!(
                        event = events::PRODUCER_CLOSE_OK,
                        component = COMPONENT,
                        outbound_topic = topic.as_str(),
                        "closed producer"
                    );
                    summary.closed.push(topic);
                }
                Err(err) => {
                    warn!(
                        event = events::PRODUCER_CLOSE_FAILED,
                        component = COMPONENT,
                        outbound_topic = topic.as_str(),
                        err = %err,
                        "unable to close producer"
                    );
                    summary.failed.push((topic, err));
                }
            }
        }
        summary
    }
}
