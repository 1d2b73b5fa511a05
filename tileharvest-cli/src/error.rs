//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use tileharvest::backend::BackendError;
use tileharvest::config::ConfigFileError;
use tileharvest::region::SelectionError;
use tileharvest::workflow::WorkflowError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Ctrl-C handler could not be installed
    Signal(String),
    /// Config file could not be read or parsed
    ConfigFile(ConfigFileError),
    /// The selected region cannot be turned into tiles
    Selection(SelectionError),
    /// Talking to the backend failed
    Backend(BackendError),
    /// The download workflow stopped
    Workflow(WorkflowError),
    /// The generation task ended in an unexpected state
    Task(String),
    /// Async runtime could not be started
    Runtime(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Backend(BackendError::Transport { .. })
            | CliError::Workflow(WorkflowError::StartDownload(BackendError::Transport { .. })) => {
                eprintln!();
                eprintln!("Could not reach the tile backend. Check that:");
                eprintln!("  1. The backend server is running");
                eprintln!("  2. [server] url in config.ini or --server points at it");
            }
            CliError::Selection(SelectionError::EmptyRegion) => {
                eprintln!();
                eprintln!("Select a region with --bbox west,south,east,north");
                eprintln!("or with three or more --point lat,lon vertices.");
            }
            CliError::ConfigFile(_) => {
                eprintln!();
                eprintln!(
                    "Fix or remove {}",
                    tileharvest::config::config_file_path().display()
                );
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Signal(msg) => write!(f, "Failed to set signal handler: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Selection(e) => write!(f, "Invalid selection: {}", e),
            CliError::Backend(e) => write!(f, "Backend error: {}", e),
            CliError::Workflow(e) => write!(f, "Download failed: {}", e),
            CliError::Task(reason) => write!(f, "World generation task: {}", reason),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Selection(e) => Some(e),
            CliError::Backend(e) => Some(e),
            CliError::Workflow(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<SelectionError> for CliError {
    fn from(e: SelectionError) -> Self {
        CliError::Selection(e)
    }
}

impl From<BackendError> for CliError {
    fn from(e: BackendError) -> Self {
        CliError::Backend(e)
    }
}

impl From<WorkflowError> for CliError {
    fn from(e: WorkflowError) -> Self {
        CliError::Workflow(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_and_source() {
        let err = CliError::from(SelectionError::Degenerate { zoom: 3 });
        assert!(err.to_string().starts_with("Invalid selection"));
        assert!(err.source().is_some());

        let err = CliError::Config("no zoom level".to_string());
        assert_eq!(err.to_string(), "Configuration error: no zoom level");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_signal_handler_error_is_not_a_config_error() {
        let err = CliError::Signal("handler already registered".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to set signal handler: handler already registered"
        );
        assert!(!err.to_string().starts_with("Configuration error"));
        assert!(err.source().is_none());
    }
}
