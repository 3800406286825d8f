//! Hub Handle
//!
//! The sending side of the hub's three inboxes. Every task other than the
//! hub itself talks to the hub through a [`HubHandle`].

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Bytes;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// Opaque identity of a connected client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What the hub keeps for each member: its identity and the producing end
/// of its outbound queue. Dropping the sender closes the queue.
#[derive(Debug)]
pub struct ClientHandle {
    pub id: ClientId,
    pub sender: mpsc::Sender<Bytes>,
}

/// Join event carrying an acknowledgement back to the joining client
#[derive(Debug)]
pub(crate) struct JoinRequest {
    pub client: ClientHandle,
    pub ack: oneshot::Sender<()>,
}

/// Hub errors seen by callers
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("hub is not running")]
    Closed,
}

/// Cloneable handle to a running hub
#[derive(Debug, Clone)]
pub struct HubHandle {
    join_tx: mpsc::UnboundedSender<JoinRequest>,
    leave_tx: mpsc::UnboundedSender<ClientId>,
    broadcast_tx: mpsc::UnboundedSender<Bytes>,
    active: Arc<AtomicUsize>,
}

/// Receiving side of the hub inboxes, owned by the control loop
#[derive(Debug)]
pub(crate) struct Inbox {
    pub joins: mpsc::UnboundedReceiver<JoinRequest>,
    pub leaves: mpsc::UnboundedReceiver<ClientId>,
    pub broadcasts: mpsc::UnboundedReceiver<Bytes>,
    pub active: Arc<AtomicUsize>,
}

/// Create a connected handle/inbox pair
pub(crate) fn channel() -> (HubHandle, Inbox) {
    let (join_tx, joins) = mpsc::unbounded_channel();
    let (leave_tx, leaves) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcasts) = mpsc::unbounded_channel();
    let active = Arc::new(AtomicUsize::new(0));

    let handle = HubHandle {
        join_tx,
        leave_tx,
        broadcast_tx,
        active: Arc::clone(&active),
    };
    let inbox = Inbox {
        joins,
        leaves,
        broadcasts,
        active,
    };
    (handle, inbox)
}

impl HubHandle {
    /// Register a client and wait until the hub has processed the join.
    ///
    /// Once this returns, every later broadcast is fanned out to the client.
    pub async fn join(&self, client: ClientHandle) -> Result<(), HubError> {
        let (ack, joined) = oneshot::channel();
        self.join_tx
            .send(JoinRequest { client, ack })
            .map_err(|_| HubError::Closed)?;
        joined.await.map_err(|_| HubError::Closed)
    }

    /// Deregister a client. Fire-and-forget.
    pub fn leave(&self, id: ClientId) {
        if self.leave_tx.send(id).is_err() {
            tracing::debug!(client_id = %id, "Leave dropped, hub not running");
        }
    }

    /// Hand a payload to the hub for fan-out. Fire-and-forget.
    pub fn broadcast(&self, payload: Bytes) {
        if self.broadcast_tx.send(payload).is_err() {
            tracing::debug!("Broadcast dropped, hub not running");
        }
    }

    /// Membership size as last published by the control loop
    pub fn active_clients(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Whether the control loop is still accepting events
    pub fn is_running(&self) -> bool {
        !self.join_tx.is_closed()
    }
}
