//! Binary entry point for the diskprov CLI.

use std::io::{self, Write};
use std::process;

use camino::Utf8Path;
use clap::Parser;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use diskprov::manifest::{self, ManifestError};
use diskprov::provisioner::ownership::foreign_volume_reason;
use diskprov::{
    DiskProvisioner, ProvisionerConfig, ProvisionerError, ScalewayClientError, ScalewayConfig,
    ScalewayDiskClient, VolumeProvisioner,
};

mod cli;

use cli::{Cli, DeleteCommand, ProvisionCommand};

type Provisioner = DiskProvisioner<ScalewayDiskClient>;

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("backend error: {0}")]
    Backend(#[from] ScalewayClientError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Provisioner(#[from] ProvisionerError<ScalewayClientError>),
    #[error("failed to write descriptor: {0}")]
    Output(String),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli {
        Cli::Provision(command) => provision(command).await,
        Cli::Delete(command) => delete(command).await,
    }
}

fn build_provisioner() -> Result<Provisioner, CliError> {
    let lifecycle = ProvisionerConfig::load_without_cli_args()
        .map_err(|err| CliError::Config(err.to_string()))?;
    let settings = lifecycle
        .settings()
        .map_err(|err| CliError::Config(err.to_string()))?;
    let scaleway =
        ScalewayConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    let client = ScalewayDiskClient::new(&scaleway, lifecycle.poll_interval())?;
    Ok(DiskProvisioner::new(client, settings))
}

async fn provision(args: ProvisionCommand) -> Result<(), CliError> {
    let request = manifest::read_request(Utf8Path::new(&args.request))?;
    let provisioner = build_provisioner()?;
    let descriptor = provisioner.provision(&request).await?;

    match args.output {
        Some(path) => {
            manifest::write_descriptor(Utf8Path::new(&path), &descriptor)?;
            info!(%path, volume = %descriptor.name, "descriptor written");
        }
        None => {
            let rendered = manifest::render_descriptor(&descriptor)?;
            io::stdout()
                .write_all(rendered.as_bytes())
                .map_err(|err| CliError::Output(err.to_string()))?;
        }
    }
    Ok(())
}

async fn delete(args: DeleteCommand) -> Result<(), CliError> {
    let descriptor = manifest::read_descriptor(Utf8Path::new(&args.descriptor))?;
    if let Some(reason) = foreign_volume_reason(&descriptor) {
        report_skip(&reason);
        return Ok(());
    }

    let provisioner = build_provisioner()?;
    match provisioner.delete(&descriptor).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_ignorable() => {
            report_skip(&err.to_string());
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn report_skip(reason: &str) {
    writeln!(io::stderr(), "skipped: {reason}").ok();
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
