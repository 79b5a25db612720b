//! Connection registry
//!
//! Tracks every live connection and the user identity each one is bound to.

mod connection;
mod registry;

pub use connection::Connection;
pub use registry::{ConnectionRegistry, Identified, RegistryError, Unregistered};
