//! Shared setup for commands that talk to the network.
//!
//! `CliRunner` loads the configuration file, installs logging and owns the
//! tokio runtime, so each command only resolves its own arguments.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Runtime;
use tracing::{info, warn};

use justthedogs::config::{config_file_path, default_log_dir, ConfigFile};
use justthedogs::logging::{init_logging, LoggingGuard, LoggingOptions};
use justthedogs::provider::{DogApiProvider, ReqwestClient};

use crate::error::CliError;

/// Blocking stdin readers can hold the runtime open; don't wait for them long.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

/// Provider settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ProviderOverrides {
    pub metadata_url: Option<String>,
    pub timeout: Option<u64>,
}

/// Runtime, config and logging for a single CLI invocation.
pub struct CliRunner {
    config: ConfigFile,
    runtime: Runtime,
    logging: LoggingGuard,
}

impl CliRunner {
    /// Loads config, initializes logging and builds the runtime.
    ///
    /// `verbose` mirrors log output to stderr.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let (config, config_warning) = match ConfigFile::load() {
            Ok(config) => (config, None),
            Err(e) => (ConfigFile::default(), Some(e)),
        };

        let log_dir = config
            .logging
            .directory
            .clone()
            .unwrap_or_else(default_log_dir);
        let options = LoggingOptions::new(log_dir)
            .with_level(config.logging.level.as_str())
            .with_stderr(verbose);
        let logging = init_logging(&options)?;

        if let Some(e) = config_warning {
            warn!(error = %e, "Ignoring unreadable config file, using defaults");
            eprintln!("Warning: {} (using defaults)", e);
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("justthedogs")
            .build()
            .map_err(|e| CliError::Runtime(format!("Failed to start async runtime: {}", e)))?;

        Ok(Self {
            config,
            runtime,
            logging,
        })
    }

    /// Logs the invocation.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = justthedogs::VERSION,
            command,
            config = %config_file_path().display(),
            log_file = %self.logging.log_file().display(),
            "JustTheDogs starting"
        );
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Runs a future to completion on the runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Builds the dog.ceo provider, CLI values taking precedence over config.
    pub fn create_provider(
        &self,
        overrides: &ProviderOverrides,
    ) -> Result<DogApiProvider<ReqwestClient>, CliError> {
        let timeout = overrides.timeout.unwrap_or(self.config.api.timeout);
        if timeout == 0 {
            return Err(CliError::Config(
                "Timeout must be at least 1 second".to_string(),
            ));
        }

        let metadata_url = overrides
            .metadata_url
            .clone()
            .unwrap_or_else(|| self.config.api.metadata_url.clone());

        let client = ReqwestClient::with_timeout(timeout)?;
        info!(url = %metadata_url, timeout_secs = timeout, "Created dog.ceo provider");
        Ok(DogApiProvider::with_metadata_url(client, metadata_url))
    }

    /// Stops the runtime without waiting on stuck blocking tasks.
    pub fn shutdown(self) {
        info!("JustTheDogs exiting");
        self.runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
    }
}
