//! Store the registry API key.
//!
//! ```bash
//! bx-components config                 # prompt for the key
//! bx-components config --api-key KEY   # non-interactive
//! bx-components config --show-path     # where the key is stored
//! ```
//!
//! Saving always replaces the whole record.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use dialoguer::Password;
use dialoguer::theme::ColorfulTheme;

use super::CliConfig;
use crate::config::{Credential, CredentialStore};

#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// API key to store instead of prompting for it
    #[arg(long)]
    api_key: Option<String>,

    /// Print the credential file location and exit
    #[arg(long, conflicts_with = "api_key")]
    show_path: bool,
}

impl ConfigCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let store = config.credential_store()?;

        if self.show_path {
            println!("{}", store.path().display());
            return Ok(());
        }

        let key = match self.api_key {
            Some(key) => key,
            None if config.interactive => prompt_api_key()?,
            None => bail!("No API key given. Pass --api-key when not running in a terminal"),
        };

        save_api_key(&store, &key).await?;
        println!("{} Configuration saved to {}", "✓".green(), store.path().display());
        Ok(())
    }
}

/// Ask for the API key without echoing it.
pub(super) fn prompt_api_key() -> Result<String> {
    let key = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter your API key")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("API key is required")
            } else {
                Ok(())
            }
        })
        .interact()?;
    Ok(key)
}

/// Replace the stored record with `key`.
pub(super) async fn save_api_key(store: &CredentialStore, key: &str) -> Result<Credential> {
    let key = key.trim();
    if key.is_empty() {
        bail!("API key is required");
    }

    let credential = Credential::new(key);
    store.save(&credential).await?;
    Ok(credential)
}
