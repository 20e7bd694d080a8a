//! Dashboard server
//!
//! Serves the wallet dashboard as a JSON API: current state, session
//! actions, payments and the out-of-band approval queue of the local
//! wallet.

pub mod api;
pub mod approvals;
pub mod config;
pub mod error;
pub mod manager;

pub use approvals::{PendingApproval, PendingApprovals};
pub use config::DashboardConfig;
pub use error::ApiError;
pub use manager::DashboardManager;
