//! Wire protocol
//!
//! JSON event envelopes exchanged with connected clients. Event names and
//! payload shapes are part of the external contract; changing them breaks
//! deployed front ends.

mod client;
mod server;

pub use client::ClientEvent;
pub use server::ServerEvent;
