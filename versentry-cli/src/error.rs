//! CLI-specific error types
//!
//! Every variant means the run was aborted. A completed sweep exits 0
//! even when bad versions were found.

use versentry_core::error::{StoreError, VersentryError};
use versentry_inventory::ScannerError;

/// CLI-specific error type.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// Inventory store could not be opened or failed mid-sweep.
    #[error("inventory store error: {0}")]
    Store(String),

    /// Sweep failed for a reason other than configuration or store.
    #[error("scan error: {0}")]
    Scan(String),

    /// Logging could not be initialized.
    #[error("logging error: {0}")]
    Logging(String),

    /// IO error (stdout write, log directory, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<VersentryError> for CliError {
    fn from(e: VersentryError) -> Self {
        match e {
            VersentryError::Config(inner) => Self::Config(inner.to_string()),
            VersentryError::Store(inner) => Self::Store(inner.to_string()),
            VersentryError::Io(inner) => Self::Io(inner),
            VersentryError::Scan(msg) => Self::Scan(msg),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::Store(e.to_string())
    }
}

impl From<ScannerError> for CliError {
    fn from(e: ScannerError) -> Self {
        match e {
            ScannerError::Store(inner) => Self::Store(inner.to_string()),
            ScannerError::Config { .. } => Self::Config(e.to_string()),
            other => Self::Scan(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(e: anyhow::Error) -> Self {
        Self::Logging(format!("{e:#}"))
    }
}
