//! Broadcast Hub
//!
//! The relay core: a single control loop owning the set of connected
//! clients, and the per-client read/write loops feeding it.
//!
//! ```text
//! read loop --Broadcast--> +-----+ --try_send--> outbound queue --> write loop
//! serve()   --Join/Leave-> | Hub |
//!                          +-----+
//! ```

mod client;
mod handle;
mod room;

pub use client::{Client, Frame};
pub use handle::{ClientHandle, ClientId, HubError, HubHandle};
pub use room::Hub;
