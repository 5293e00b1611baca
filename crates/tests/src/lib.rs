//! Integration Tests for the Multirpc Execution Engine
//!
//! This crate contains the test modules:
//!
//! - `setup_tests`: Pool materialization, connectivity probing, and chain id resolution
//! - `view_tests`: Batched view-call execution with group fallback over HTTP
//! - `write_path_tests`: The full build/sign/broadcast/confirm pipeline over HTTP
//! - `query_tests`: Receipt and block lookups with the last-error convention
//! - `mock_infrastructure`: Reusable mock types for testing (RPC servers, collaborators)
//!
//! All tests run against local mockito servers; no live chain is required.
//!
//! ```bash
//! cargo test --package tests
//! ```

#[cfg(test)]
mod setup_tests;

#[cfg(test)]
mod view_tests;

#[cfg(test)]
mod write_path_tests;


/// Mock infrastructure for testing
pub mod mock_infrastructure;
