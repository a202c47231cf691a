//! bx-components CLI entry point
//!
//! Parses arguments, wires Ctrl-C to the cancellation flag of commands that
//! talk to the registry, and renders errors with suggestions before exiting
//! with status 1. A second Ctrl-C exits immediately with status 130.

use anyhow::Result;
use bx_components::cli;
use bx_components::core::{BxError, user_friendly_error};
use bx_components::installer::CancellationFlag;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cancel = CancellationFlag::new();
    if cli.is_cancellable() {
        tokio::spawn(watch_interrupts(cancel.clone()));
    }

    match cli.execute(cancel).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let cancelled = matches!(e.downcast_ref::<BxError>(), Some(BxError::Cancelled));
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(if cancelled { EXIT_INTERRUPTED } else { 1 });
        }
    }
}

const EXIT_INTERRUPTED: i32 = 130;

/// First Ctrl-C cancels the running command, the second exits.
async fn watch_interrupts(cancel: CancellationFlag) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    cancel.cancel();
    eprintln!("\nCancelling... press Ctrl-C again to exit immediately");

    if tokio::signal::ctrl_c().await.is_ok() {
        std::process::exit(EXIT_INTERRUPTED);
    }
}
