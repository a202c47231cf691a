//! Integration test suite for bx-components
//!
//! End-to-end tests that run the compiled binary against an `httpmock`
//! registry and a temporary project directory.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **add**: Installing components and their dependencies
//! - **config**: Storing the API key
//! - **list**: Listing registry components

#[path = "../common/mod.rs"]
mod common;

mod add;
mod config;
mod list;
