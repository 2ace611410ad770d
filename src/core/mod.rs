//! Core business logic - framework-agnostic store operations.
//!
//! Every operation takes the store as `&dyn Store` and, where it matters who is
//! acting, the [`session::Session`] explicitly.

/// Admin panel: employees, settings, backups
pub mod admin;
/// Sales aggregates
pub mod analytics;
/// Backup export and restore
pub mod backup;
/// Dashboard headline numbers
pub mod dashboard;
/// Product management
pub mod inventory;
/// Sale recording and reversal
pub mod ledger;
/// Transaction history
pub mod sales;
/// First-run seeding
pub mod seed;
/// Login and role checks
pub mod session;
