//! minimind-probe: report visible accelerators, then print the model
//! configuration a pretraining run would start from.
//!
//! Usage: `minimind-probe [--config lm.json] [--json] [--verbose]`

use std::io::{self, Write};

use clap::Parser;
use tracing::info;

use minimind_probe::config::{Cli, LmConfig};
use minimind_probe::gpu::device::detect_devices;
use minimind_probe::gpu::report::{report_devices, write_json};
use minimind_probe::gpu::runtime::default_runtime;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with the report.
    let filter = if cli.verbose {
        "minimind_probe=debug"
    } else {
        "minimind_probe=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    info!("minimind-probe v{}", env!("CARGO_PKG_VERSION"));

    let runtime = default_runtime();
    info!(backend = runtime.backend(), "Accelerator runtime selected");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.json {
        let devices = detect_devices(runtime.as_ref())?;
        let config = load_config(&cli)?;
        write_json(&devices, &config, &mut out)?;
        return Ok(());
    }

    report_devices(runtime.as_ref(), &mut out)?;

    let config = load_config(&cli)?;
    writeln!(out, "{config}")?;

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<LmConfig> {
    let config = match &cli.config {
        Some(path) => LmConfig::load(path)?,
        None => LmConfig::default(),
    };
    let ffn_hidden_dim = config.ffn_hidden_dim()?;
    info!(
        dim = config.dim,
        n_layers = config.n_layers,
        n_heads = config.n_heads,
        ffn_hidden_dim,
        "Configuration ready"
    );
    Ok(config)
}
