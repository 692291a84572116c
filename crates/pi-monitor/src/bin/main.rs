//! Pi Monitor CLI
//!
//! # Usage
//!
//! ```bash
//! # One pass over monitor.config.json
//! pi-monitor
//!
//! # Explicit command and configuration file
//! pi-monitor run --configfile monitor.config.yaml --concurrency 8
//!
//! # Validate a configuration file
//! pi-monitor validate -c monitor.config.json --format json
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success - every target was checked
//! - 3: Invalid input or configuration
//! - 10: Internal error

use anyhow::Context;
use clap::Parser;
use pi_monitor::{run_cli, telemetry, MonitorCli};

fn main() -> anyhow::Result<()> {
    let cli = MonitorCli::parse();
    telemetry::init_logging(cli.verbose, cli.log_format);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let exit_code = runtime.block_on(run_cli(cli));
    std::process::exit(exit_code.into());
}
