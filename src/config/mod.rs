//! Configuration for bx-components
//!
//! Only one value is persisted between runs: the API key used to authenticate
//! against the registry. Everything else (registry URL, framework, output
//! path, timeouts) comes from command-line flags or environment variables.
//!
//! ```rust,no_run
//! use bx_components::config::{Credential, CredentialStore};
//!
//! # async fn example() -> Result<(), bx_components::core::BxError> {
//! let store = CredentialStore::new()?;
//! store.save(&Credential::new("my-api-key")).await?;
//! let credential = store.load().await?;
//! # Ok(())
//! # }
//! ```

mod credentials;

pub use credentials::{Credential, CredentialStore};
