//! burner: command-line access to an Afterburner heater.
//!
//! # Usage
//!
//! ```text
//! burner [OPTIONS] <COMMAND>
//!
//! Commands:
//!   get  <NAME> [--refresh]   Print one parameter
//!   set  <NAME> <VALUE>       Write a parameter and verify it
//!   run  <0|1>                Stop (0) or start (1) the heater
//!   dump                      Refresh and print every reported parameter
//!   config                    Print the effective client config as TOML
//!
//! Options:
//!   --endpoint <HOST[:PORT]>  Heater address [env: BURNER_ENDPOINT]
//!   --config   <PATH>         TOML client config
//! ```
//!
//! The process exits non-zero when it cannot connect, when a value is
//! rejected before sending, or when the heater does not confirm a write.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use burner_client::{new_client, ClientConfig, HeaterClient, ParamValue, Parameter};
use burner_core::render_value;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Read and write settings on an Afterburner diesel heater.
#[derive(Debug, Parser)]
#[command(
    name = "burner",
    about = "Read and write settings on an Afterburner diesel heater",
    version
)]
struct Cli {
    /// Heater address, `host` or `host:port`.
    ///
    /// Overrides the endpoint from `--config`.
    #[arg(long, env = "BURNER_ENDPOINT")]
    endpoint: Option<String>,

    /// TOML file with the endpoint and timing overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Print the last-known value of one parameter.
    Get {
        /// Parameter name, e.g. `TempCurrent`.
        name: String,
        /// Ask the heater to push its state before reading.
        #[arg(long)]
        refresh: bool,
    },
    /// Write one parameter and wait for the heater to confirm it.
    Set {
        /// Parameter name, e.g. `TempDesired`.
        name: Parameter,
        /// New value; integers are sent as integers.
        #[arg(value_parser = parse_value, allow_negative_numbers = true)]
        value: ParamValue,
    },
    /// Stop (0) or start (1) the heater.
    Run {
        mode: i64,
    },
    /// Refresh and print every parameter the heater reported.
    Dump,
    /// Print the effective client config as TOML without connecting.
    Config,
}

impl Cli {
    /// Builds the client config: file first, then `--endpoint` on top.
    ///
    /// # Errors
    ///
    /// Returns an error if `--config` names a file that cannot be read or
    /// parsed.
    fn into_client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ClientConfig::default(),
        };
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        Ok(config)
    }
}

/// Parses a command-line value, preferring an integer.
fn parse_value(raw: &str) -> Result<ParamValue, String> {
    if let Ok(int) = raw.parse::<i64>() {
        return Ok(ParamValue::Int(int));
    }
    match raw.parse::<f64>() {
        Ok(float) if float.is_finite() => Ok(ParamValue::Float(float)),
        Ok(_) => Err(format!("'{raw}' is not a finite number")),
        Err(_) => Err(format!("'{raw}' is not a number")),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Output for commands that never touch the heater, or `None` if `command`
/// needs a connection.
fn offline_output(
    command: &CliCommand,
    config: &ClientConfig,
) -> anyhow::Result<Option<String>> {
    match command {
        CliCommand::Config => Ok(Some(
            config
                .to_toml_string()
                .context("failed to render config")?,
        )),
        _ => Ok(None),
    }
}

async fn run_command(client: &HeaterClient, command: CliCommand) -> anyhow::Result<()> {
    match command {
        CliCommand::Get { name, refresh } => match client.fetch(&name, refresh).await {
            Some(value) => println!("{value}"),
            None => bail!("the heater has not reported {name}"),
        },
        CliCommand::Set { name, value } => {
            let confirmed = set_parameter(client, name, value).await?;
            if !confirmed {
                bail!("{name} = {value} was not confirmed by the heater");
            }
            println!("{name} = {value}");
        }
        CliCommand::Run { mode } => {
            if !client.set_run_mode(mode).await? {
                bail!("run mode {mode} was not confirmed by the heater");
            }
            println!("Run = {mode}");
        }
        CliCommand::Dump => {
            client.refresh().await;
            let state: BTreeMap<_, _> = client.snapshot().await.into_iter().collect();
            if state.is_empty() {
                bail!("the heater did not report any state");
            }
            for (key, value) in state {
                println!("{key} = {}", render_value(&value));
            }
        }
        // Answered by `offline_output` before connecting.
        CliCommand::Config => {}
    }
    Ok(())
}

/// Writes one parameter; values the client rejects become errors.
async fn set_parameter(
    client: &HeaterClient,
    name: Parameter,
    value: ParamValue,
) -> anyhow::Result<bool> {
    if name == Parameter::Refresh {
        bail!("Refresh is not a settable parameter");
    }
    let outcome = client.set_config_outcome(name.as_str(), value).await?;
    Ok(outcome.is_confirmed())
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only values.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.into_client_config()?;
    if let Some(text) = offline_output(&cli.command, &config)? {
        print!("{text}");
        return Ok(());
    }
    info!("connecting to heater at {}", config.uri());

    let client = new_client(&config);
    if !client.connect().await {
        bail!("could not connect to {}", config.uri());
    }

    let result = run_command(&client, cli.command).await;
    client.close().await;
    result
}

// ── Tests ─────────────────────────────────────────────────────────────────────
