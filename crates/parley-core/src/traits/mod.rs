//! Collaborator traits (ports) for the excluded subsystems

mod collaborators;

pub use collaborators::{ChatStore, StoreResult, UserDirectory};
