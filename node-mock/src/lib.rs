/// Algorand Mock Node Library
///
/// An in-memory algod v2 subset plus a Bitquery-shaped GraphQL history
/// endpoint, usable as a standalone binary or mounted in tests.

pub mod handlers;
pub mod ledger;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use ledger::{address_of, Ledger, LedgerError};
pub use server::{create_router, run_server, spawn_confirmer};
pub use types::*;
