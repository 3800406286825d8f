//! Hub Control Loop
//!
//! The hub owns the set of active clients. Join, leave and broadcast events
//! arrive on three inboxes and are applied one at a time by [`Hub::run`], so
//! membership is only ever touched from this loop.

use std::collections::HashMap;
use std::sync::atomic::Ordering;

use axum::body::Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::handle::{self, ClientId, HubHandle, Inbox, JoinRequest};
use crate::infrastructure::metrics;

/// Broadcast hub (a single chat room)
pub struct Hub {
    clients: HashMap<ClientId, mpsc::Sender<Bytes>>,
    inbox: Inbox,
}

impl Hub {
    /// Create a hub and the handle used to reach it
    pub fn new() -> (Self, HubHandle) {
        let (handle, inbox) = handle::channel();
        let hub = Self {
            clients: HashMap::new(),
            inbox,
        };
        (hub, handle)
    }

    /// Create a hub and run its control loop on a dedicated task
    pub fn spawn() -> HubHandle {
        let (hub, handle) = Self::new();
        tokio::spawn(hub.run());
        handle
    }

    /// Run the control loop.
    ///
    /// Returns once every [`HubHandle`] has been dropped.
    pub async fn run(mut self) {
        tracing::info!("Hub started");

        loop {
            tokio::select! {
                Some(request) = self.inbox.joins.recv() => self.handle_join(request),
                Some(id) = self.inbox.leaves.recv() => self.handle_leave(id),
                Some(payload) = self.inbox.broadcasts.recv() => self.handle_broadcast(payload),
                else => break,
            }
        }

        tracing::info!(remaining = self.clients.len(), "Hub stopped");
    }

    fn handle_join(&mut self, request: JoinRequest) {
        let JoinRequest { client, ack } = request;

        if self.clients.insert(client.id, client.sender).is_some() {
            tracing::warn!(client_id = %client.id, "Client joined twice, previous queue replaced");
        }
        self.publish_membership();
        tracing::info!(client_id = %client.id, active = self.clients.len(), "Client joined");

        // The joining side may have given up waiting
        let _ = ack.send(());
    }

    fn handle_leave(&mut self, id: ClientId) {
        // Removing the sender closes the client's outbound queue
        match self.clients.remove(&id) {
            Some(_) => {
                self.publish_membership();
                tracing::info!(client_id = %id, active = self.clients.len(), "Client left");
            }
            None => {
                tracing::debug!(client_id = %id, "Leave for inactive client ignored");
            }
        }
    }

    fn handle_broadcast(&mut self, payload: Bytes) {
        metrics::BROADCASTS_TOTAL.inc();

        let mut delivered = 0u64;
        let mut evicted = 0u64;

        self.clients.retain(|id, sender| match sender.try_send(payload.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(client_id = %id, "Outbound queue full, evicting client");
                evicted += 1;
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(client_id = %id, "Outbound queue gone, evicting client");
                evicted += 1;
                false
            }
        });

        metrics::DELIVERIES_TOTAL.inc_by(delivered);
        if evicted > 0 {
            metrics::EVICTIONS_TOTAL.inc_by(evicted);
            self.publish_membership();
        }

        tracing::trace!(
            bytes = payload.len(),
            delivered = delivered,
            evicted = evicted,
            "Broadcast fanned out"
        );
    }

    fn publish_membership(&self) {
        let active = self.clients.len();
        self.inbox.active.store(active, Ordering::Release);
        metrics::CLIENTS_ACTIVE.set(active as i64);
    }
}
