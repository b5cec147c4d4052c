//! # Compute Scheduler Testing Utils
//!
//! Shared test support for the workspace crates.
//!
//! - **Mocks**: mockall doubles for the collaborator ports
//! - **Builders**: task and history records with sensible defaults
//!
//! ```toml
//! [dev-dependencies]
//! compute-scheduler-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod mocks;

pub use builders::*;
pub use mocks::*;
