//! burner-sim: run a simulated heater on the local network.
//!
//! # Usage
//!
//! ```text
//! burner-sim [OPTIONS]
//!
//! Options:
//!   --bind <ADDR>            Listen address [default: 127.0.0.1:8889]
//!   --policy <apply|ignore>  How writes are treated [default: apply]
//!   --offset <DELTA>         Store requested + DELTA for numeric writes
//!   --run-delay-ms <MS>      Delay before RunState follows Run [default: 1000]
//!   --echo-diagnostics       Reply "Data received as: ...!" to every frame
//! ```
//!
//! | Variable               | Default          |
//! |------------------------|------------------|
//! | `BURNER_SIM_BIND`      | `127.0.0.1:8889` |
//! | `BURNER_SIM_RUN_DELAY` | `1000`           |

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use burner_sim::{default_initial_state, DeviceSimulator, SimConfig, WritePolicy};

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Apply,
    Ignore,
}

/// Simulated Afterburner heater.
#[derive(Debug, Parser)]
#[command(
    name = "burner-sim",
    about = "Simulated Afterburner heater WebSocket interface",
    version
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8889", env = "BURNER_SIM_BIND")]
    bind: String,

    /// How configuration writes are treated.
    #[arg(long, value_enum, default_value_t = PolicyArg::Apply)]
    policy: PolicyArg,

    /// Store `requested + offset` for numeric writes.  Overrides `--policy`.
    #[arg(long, allow_negative_numbers = true)]
    offset: Option<f64>,

    /// Milliseconds between `{"Run": n}` and the matching RunState change.
    #[arg(long, default_value_t = 1000, env = "BURNER_SIM_RUN_DELAY")]
    run_delay_ms: u64,

    /// Reply with a diagnostic to every frame, not only malformed ones.
    #[arg(long)]
    echo_diagnostics: bool,
}

impl Cli {
    /// # Errors
    ///
    /// Returns an error if `--bind` is not a socket address or `--offset`
    /// is not finite.
    fn into_sim_config(self) -> anyhow::Result<SimConfig> {
        let bind_addr: SocketAddr = self
            .bind
            .parse()
            .with_context(|| format!("invalid bind address: '{}'", self.bind))?;

        let write_policy = match (self.offset, self.policy) {
            (Some(offset), _) if !offset.is_finite() => bail!("--offset must be finite"),
            (Some(offset), _) => WritePolicy::Offset(offset),
            (None, PolicyArg::Apply) => WritePolicy::Apply,
            (None, PolicyArg::Ignore) => WritePolicy::Ignore,
        };

        Ok(SimConfig {
            bind_addr,
            initial_state: default_initial_state(),
            write_policy,
            run_transition_delay: Duration::from_millis(self.run_delay_ms),
            echo_diagnostics: self.echo_diagnostics,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_sim_config()?;
    info!(
        "starting heater simulator: bind={}, policy={:?}",
        config.bind_addr, config.write_policy
    );

    let sim = DeviceSimulator::start(config).await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("received Ctrl+C, shutting down");

    sim.stop().await;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        // Arrange / Act
        let cli = Cli::parse_from(["burner-sim"]);

        // Assert
        assert_eq!(cli.policy, PolicyArg::Apply);
        assert_eq!(cli.offset, None);
        assert!(!cli.echo_diagnostics);
    }

    #[test]
    fn test_into_sim_config_default_policy_is_apply() {
        let config = Cli::parse_from(["burner-sim", "--bind", "127.0.0.1:9001"])
            .into_sim_config()
            .unwrap();
        assert_eq!(config.bind_addr.port(), 9001);
        assert_eq!(config.write_policy, WritePolicy::Apply);
    }

    #[test]
    fn test_ignore_policy() {
        let config = Cli::parse_from(["burner-sim", "--policy", "ignore"])
            .into_sim_config()
            .unwrap();
        assert_eq!(config.write_policy, WritePolicy::Ignore);
    }

    #[test]
    fn test_offset_overrides_policy() {
        let config = Cli::parse_from(["burner-sim", "--policy", "ignore", "--offset", "-0.5"])
            .into_sim_config()
            .unwrap();
        assert_eq!(config.write_policy, WritePolicy::Offset(-0.5));
    }

    #[test]
    fn test_run_delay_override() {
        let config = Cli::parse_from(["burner-sim", "--run-delay-ms", "25"])
            .into_sim_config()
            .unwrap();
        assert_eq!(config.run_transition_delay, Duration::from_millis(25));
    }

    #[test]
    fn test_invalid_bind_address_returns_error() {
        let cli = Cli::parse_from(["burner-sim", "--bind", "not.an.addr"]);
        assert!(cli.into_sim_config().is_err());
    }

    #[test]
    fn test_non_finite_offset_returns_error() {
        let cli = Cli::parse_from(["burner-sim", "--offset", "inf"]);
        assert!(cli.into_sim_config().is_err());
    }
}
