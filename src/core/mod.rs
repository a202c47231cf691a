//! Core types and error handling for bx-components
//!
//! - [`error`] - [`BxError`], [`ErrorContext`] and [`user_friendly_error`]
//! - [`framework`] - the closed [`Framework`] enumeration

pub mod error;
pub mod framework;

pub use error::{BxError, ErrorContext, user_friendly_error};
pub use framework::Framework;
