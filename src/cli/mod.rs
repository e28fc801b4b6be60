//! Command-line interface definitions for the `diskprov` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `diskprov` binary.
#[derive(Debug, Parser)]
#[command(
    name = "diskprov",
    about = "Provision and delete block-storage volumes on Scaleway",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Create a disk for a volume request and print its descriptor.
    #[command(
        name = "provision",
        about = "Create a disk for a volume request and print its descriptor"
    )]
    Provision(ProvisionCommand),
    /// Delete the disk behind a descriptor this tool created.
    #[command(name = "delete", about = "Delete the disk behind a descriptor this tool created")]
    Delete(DeleteCommand),
}

/// Arguments for the `diskprov provision` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct ProvisionCommand {
    /// Path to the JSON volume request.
    #[arg(value_name = "REQUEST")]
    pub(crate) request: String,
    /// Write the descriptor to this path instead of standard output.
    #[arg(long, short, value_name = "PATH")]
    pub(crate) output: Option<String>,
}

/// Arguments for the `diskprov delete` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct DeleteCommand {
    /// Path to the JSON volume descriptor.
    #[arg(value_name = "DESCRIPTOR")]
    pub(crate) descriptor: String,
}
