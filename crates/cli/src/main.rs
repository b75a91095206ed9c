// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cronhost` — the shell-side companion to the `cronhostd` automation host.
//!
//! `cronhostd` owns the scheduler, the executor, and the forum sync loop;
//! this binary is the thin, stateless side of the system — ambient dev
//! tooling (`legacy-token-guard`, `review`) plus a read-only `status` view
//! over the same on-disk record store `cronhostd` writes.

mod color;
mod commands;
mod output;
mod table;

use clap::{Parser, Subcommand};
use commands::{legacy_token_guard, review, status};

#[derive(Parser)]
#[command(name = "cronhost", version, about = "cronhost - the forum automation host's CLI companion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fail if a residual token from this host's prior incarnation remains in the tree
    LegacyTokenGuard,
    /// Run a static review pass over one or more crate sections
    Review(review::ReviewArgs),
    /// Render the daemon's status snapshot from the on-disk record store
    Status(status::StatusArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::LegacyTokenGuard => legacy_token_guard::handle(),
        Commands::Review(args) => review::handle(args).await,
        Commands::Status(args) => status::handle(args).await,
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
