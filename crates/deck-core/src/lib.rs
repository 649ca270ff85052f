//! deckshare/crates/deck-core/src/lib.rs
//!
//! The central domain logic and interface definitions for deckshare:
//! models, port traits, the error taxonomy and the services that drive
//! presentation sharing, accounts and the client directory.

pub mod access;
pub mod accounts;
pub mod clients;
pub mod error;
pub mod input;
pub mod models;
pub mod mutation;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exporting for easier access in other crates
pub use access::AccessController;
pub use accounts::AccountService;
pub use clients::ClientDirectory;
pub use error::*;
pub use input::*;
pub use models::*;
pub use mutation::MutationService;
pub use traits::*;
