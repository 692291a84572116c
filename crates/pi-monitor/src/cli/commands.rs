//! CLI command definitions for Pi Monitor
//!
//! `run` performs one monitoring pass over every configured target and is
//! also what a bare `pi-monitor` invocation does. `validate` only loads and
//! checks a configuration file.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::output::{ConfigReport, OutputFormat, RunReport};
use super::ExitCode;
use crate::config::{read_configuration, MonitorSettings, DEFAULT_CONFIG_FILE};
use crate::error::{MonitorError, Result};
use crate::healthcheck::{run_health_checks, HealthCheckExecutor};
use crate::telemetry::{LogFormat, MonitorMetrics};

/// Pi Monitor CLI
///
/// Probe HTTP endpoints, keep statuspage.io components and incidents in
/// sync and send a notification when something changes.
#[derive(Parser, Debug)]
#[command(name = "pi-monitor")]
#[command(about = "Pi Monitor - HTTP health checks synced to statuspage.io", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct MonitorCli {
    /// Output verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<MonitorCommands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum MonitorCommands {
    /// Check every configured target once
    Run(RunArgs),

    /// Load and validate a configuration file without contacting any target
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to the monitor configuration file
    #[arg(short = 'c', long = "configfile", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Maximum number of targets checked at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Output format for the run summary
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Write metrics in Prometheus text format to this file after the run
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Path to the monitor configuration file
    #[arg(short = 'c', long = "configfile", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Output format for the summary
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl RunArgs {
    /// Apply command line overrides on top of the file settings
    pub fn apply(&self, mut settings: MonitorSettings) -> Result<MonitorSettings> {
        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                return Err(MonitorError::config("--concurrency must be at least 1"));
            }
            settings.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err(MonitorError::config("--timeout must be at least 1 second"));
            }
            settings.request_timeout_secs = timeout;
        }
        Ok(settings)
    }
}

/// Execute one monitoring pass
pub async fn execute_run(args: RunArgs) -> Result<ExitCode> {
    let settings = args.apply(read_configuration(&args.config, MonitorSettings::default())?)?;

    if settings.status_checks.is_empty() {
        tracing::warn!("No status checks configured in {}", args.config.display());
    }

    let metrics = Arc::new(MonitorMetrics::new()?);
    let executor = HealthCheckExecutor::from_settings(&settings)?.with_metrics(metrics.clone());

    let outcomes = run_health_checks(&executor, &settings.status_checks, settings.concurrency).await?;
    let report = RunReport::from_outcomes(outcomes);
    tracing::info!("{}", report.summary());
    report.render(args.format)?;

    if let Some(path) = &args.metrics_file {
        write_metrics(&metrics, path)?;
    }

    Ok(ExitCode::Success)
}

/// Load and validate a configuration file
pub fn execute_validate(args: ValidateArgs) -> Result<ExitCode> {
    if !args.config.exists() {
        return Err(MonitorError::config(format!(
            "Configuration file not found: {}",
            args.config.display()
        )));
    }

    let settings = read_configuration(&args.config, MonitorSettings::default())?;
    ConfigReport::new(args.config.display().to_string(), &settings).render(args.format)?;
    Ok(ExitCode::Success)
}

fn write_metrics(metrics: &MonitorMetrics, path: &Path) -> Result<()> {
    let text = metrics.gather_text()?;
    std::fs::write(path, text)?;
    tracing::debug!("Metrics written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["pi-monitor"];
        argv.extend_from_slice(extra);
        let cli = MonitorCli::try_parse_from(argv).unwrap();
        match cli.command {
            Some(MonitorCommands::Run(args)) => args,
            None => cli.run,
            Some(other) => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bare_invocation_runs_with_defaults() {
        let cli = MonitorCli::try_parse_from(["pi-monitor"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(cli.run.format, OutputFormat::Table);
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_parse_run_flags() {
        let args = run_args(&["run", "-c", "other.json", "--concurrency", "2", "--format", "json"]);
        assert_eq!(args.config, PathBuf::from("other.json"));
        assert_eq!(args.concurrency, Some(2));
        assert_eq!(args.format, OutputFormat::Json);

        let args = run_args(&["--configfile", "x.yaml", "--timeout", "5"]);
        assert_eq!(args.config, PathBuf::from("x.yaml"));
        assert_eq!(args.timeout, Some(5));
    }

    #[test]
    fn test_global_flags() {
        let cli = MonitorCli::try_parse_from(["pi-monitor", "validate", "-vv", "--log-format", "json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Some(MonitorCommands::Validate(_))));
    }

    #[test]
    fn test_apply_overrides() {
        let settings = run_args(&["--concurrency", "8", "--timeout", "3"])
            .apply(MonitorSettings::default())
            .unwrap();
        assert_eq!(settings.concurrency, 8);
        assert_eq!(settings.request_timeout_secs, 3);

        let err = run_args(&["--concurrency", "0"])
            .apply(MonitorSettings::default())
            .unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn test_validate_missing_file() {
        let err = execute_validate(ValidateArgs {
            config: PathBuf::from("/nonexistent/monitor.config.json"),
            format: OutputFormat::Json,
        })
        .unwrap_err();
        assert!(err.is_user_error());
    }

    #[tokio::test]
    async fn test_run_without_targets_writes_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("monitor.config.json");
        std::fs::write(&config, r#"{"status_checks": []}"#).unwrap();
        let metrics_file = dir.path().join("pi_monitor.prom");

        let code = execute_run(RunArgs {
            config,
            concurrency: None,
            timeout: None,
            format: OutputFormat::Json,
            metrics_file: Some(metrics_file.clone()),
        })
        .await
        .unwrap();

        assert_eq!(code, ExitCode::Success);
        assert!(metrics_file.exists());
    }
}
