//! Hub Client
//!
//! One connected participant: a bounded outbound queue fed by the hub and the
//! read/write loop pair that moves payloads between the connection and the hub.
//!
//! The loops are generic over any `Stream` of inbound payloads and any `Sink`
//! of outbound [`Frame`]s, so the WebSocket adapter and the tests plug in the
//! same way.

use std::fmt::Display;
use std::time::Duration;

use axum::body::Bytes;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use super::handle::{ClientHandle, ClientId, HubError, HubHandle};

/// Outbound unit handed to the connection sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Relayed message payload
    Payload(Bytes),
    /// Keepalive probe
    Ping,
}

/// A client bound to one hub, not yet serving
pub struct Client {
    handle: ClientHandle,
    hub: HubHandle,
    outbound: mpsc::Receiver<Bytes>,
    keepalive: Option<Duration>,
}

impl Client {
    /// Create a client whose outbound queue holds at most `capacity` payloads
    pub fn new(hub: HubHandle, capacity: usize) -> Self {
        let (sender, outbound) = mpsc::channel(capacity);
        Self {
            handle: ClientHandle {
                id: ClientId::new(),
                sender,
            },
            hub,
            outbound,
            keepalive: None,
        }
    }

    /// Emit a ping after `interval` without outbound traffic
    pub fn with_keepalive(mut self, interval: Option<Duration>) -> Self {
        self.keepalive = interval;
        self
    }

    pub fn id(&self) -> ClientId {
        self.handle.id
    }

    /// Serve the connection until the inbound side terminates.
    ///
    /// Joins the hub, starts the write loop on its own task, then runs the
    /// read loop on the current task. Leave is sent exactly once on every
    /// exit path after a successful join, including cancellation.
    pub async fn serve<R, E, W>(self, inbound: R, sink: W) -> Result<(), HubError>
    where
        R: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
        W: Sink<Frame> + Unpin + Send + 'static,
        W::Error: Display + Send,
    {
        let Client {
            handle,
            hub,
            outbound,
            keepalive,
        } = self;
        let id = handle.id;

        hub.join(handle).await?;

        tokio::spawn(write_loop(id, outbound, sink, keepalive));

        let _leave = LeaveGuard { hub: &hub, id };
        let received = read_loop(id, &hub, inbound).await;

        tracing::debug!(client_id = %id, received = received, "Read loop finished");
        Ok(())
    }
}

/// Sends Leave when dropped
struct LeaveGuard<'a> {
    hub: &'a HubHandle,
    id: ClientId,
}

impl Drop for LeaveGuard<'_> {
    fn drop(&mut self) {
        self.hub.leave(self.id);
    }
}

/// Forward every inbound payload to the hub until the stream ends or fails.
///
/// Returns the number of payloads forwarded.
async fn read_loop<R, E>(id: ClientId, hub: &HubHandle, mut inbound: R) -> u64
where
    R: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    let mut received = 0;

    while let Some(item) = inbound.next().await {
        match item {
            Ok(payload) => {
                received += 1;
                hub.broadcast(payload);
            }
            Err(e) => {
                tracing::debug!(client_id = %id, error = %e, "Read failed");
                break;
            }
        }
    }

    received
}

/// Drain the outbound queue into the sink in FIFO order.
///
/// Stops when the hub closes the queue or a write fails. Never sends Leave.
async fn write_loop<W>(
    id: ClientId,
    mut outbound: mpsc::Receiver<Bytes>,
    mut sink: W,
    keepalive: Option<Duration>,
) where
    W: Sink<Frame> + Unpin,
    W::Error: Display,
{
    let mut ticker = keepalive.map(|period| {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    loop {
        tokio::select! {
            next = outbound.recv() => match next {
                Some(payload) => {
                    if let Err(e) = sink.send(Frame::Payload(payload)).await {
                        tracing::debug!(client_id = %id, error = %e, "Write failed");
                        return;
                    }
                    if let Some(ticker) = ticker.as_mut() {
                        ticker.reset();
                    }
                }
                None => {
                    if let Err(e) = sink.close().await {
                        tracing::trace!(client_id = %id, error = %e, "Close after queue shutdown failed");
                    }
                    tracing::debug!(client_id = %id, "Outbound queue closed");
                    return;
                }
            },
            _ = next_tick(&mut ticker) => {
                if let Err(e) = sink.send(Frame::Ping).await {
                    tracing::debug!(client_id = %id, error = %e, "Keepalive ping failed");
                    return;
                }
            }
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
