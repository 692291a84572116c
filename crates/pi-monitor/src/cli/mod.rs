//! CLI module for Pi Monitor
//!
//! Argument parsing, command dispatch and result rendering for the
//! `pi-monitor` binary.

pub mod commands;
pub mod output;

pub use commands::{MonitorCli, MonitorCommands, RunArgs, ValidateArgs};
pub use output::{ConfigReport, OutputFormat, RunReport};

use crate::error::MonitorError;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Every target was checked; target failures are reported, not fatal
    Success = 0,
    /// Invalid arguments or configuration
    InvalidInput = 3,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Exit code for an error that aborted the command
    pub fn from_error(error: &MonitorError) -> Self {
        if error.is_user_error() {
            ExitCode::InvalidInput
        } else {
            ExitCode::InternalError
        }
    }
}

/// Run the CLI with the given arguments and return the exit code
pub async fn run(cli: MonitorCli) -> Result<ExitCode, MonitorError> {
    match cli.command {
        Some(MonitorCommands::Run(args)) => commands::execute_run(args).await,
        Some(MonitorCommands::Validate(args)) => commands::execute_validate(args),
        None => commands::execute_run(cli.run).await,
    }
}
