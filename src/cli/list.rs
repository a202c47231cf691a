//! List components available in the registry.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use crate::installer::CancellationFlag;
use crate::registry::{ComponentManifest, RegistryClient};

#[derive(Args, Debug)]
pub struct ListCommand {
    /// Print names only, one per line
    #[arg(long)]
    names: bool,
}

impl ListCommand {
    pub async fn execute(self, config: &CliConfig, cancel: CancellationFlag) -> Result<()> {
        let credential = config.credential_store()?.load().await?;
        let registry = RegistryClient::new(config.registry()?, config.http.clone())?;

        let mut components = cancel.run(registry.list_components(&credential)).await?;
        components.sort_by(|a, b| a.name.cmp(&b.name));

        if self.names {
            for component in &components {
                println!("{}", component.name);
            }
            return Ok(());
        }

        if components.is_empty() {
            println!("{}", "No components available".yellow());
            return Ok(());
        }

        for component in &components {
            println!("{}", describe(component));
        }
        Ok(())
    }
}

fn describe(component: &ComponentManifest) -> String {
    let frameworks: Vec<&str> = component.frameworks().map(|f| f.as_str()).collect();

    let mut line = format!(
        "{} {} [{}]",
        component.name.bold(),
        format!("({})", component.kind).dimmed(),
        frameworks.join(", ")
    );
    if !component.registry_dependencies.is_empty() {
        line.push_str(&format!(" → {}", component.registry_dependencies.join(", ")));
    }
    line
}
