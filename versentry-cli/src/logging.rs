//! Logging initialization for the versentry CLI.
//!
//! Configures `tracing-subscriber` from the `[general]` section of
//! `VersentryConfig`. The console layer writes to stderr in the configured
//! format and honors `RUST_LOG`. When `log_dir` is set, a second plain-text
//! layer writes to a per-run log file at `info` or more verbose.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use versentry_core::config::GeneralConfig;

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
/// Returns the path of the per-run log file, if one was opened.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines
/// * `"pretty"` - Human-readable multi-line output
/// * `"compact"` - Human-readable single-line output
pub fn init_tracing(config: &GeneralConfig) -> Result<Option<PathBuf>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let log_path = log_file_path(&config.log_dir);
    let file_layer = match &log_path {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            }
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Arc::new(file))
                    .with_filter(file_level(&config.log_level)),
            )
        }
        None => None,
    };

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(file_layer)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_filter(env_filter),
                )
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to initialize JSON tracing subscriber: {}", e))?;
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(file_layer)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr)
                        .with_filter(env_filter),
                )
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize pretty tracing subscriber: {}", e)
                })?;
        }
        "compact" => {
            tracing_subscriber::registry()
                .with(file_layer)
                .with(
                    fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr)
                        .with_filter(env_filter),
                )
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize compact tracing subscriber: {}", e)
                })?;
        }
        _ => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json', 'pretty' or 'compact'",
                config.log_format
            ));
        }
    }

    Ok(log_path)
}

/// Level for the per-run log file: the configured level, but never less than `info`.
///
/// The run log always keeps the per-folder progress lines, whatever the console shows.
pub fn file_level(log_level: &str) -> LevelFilter {
    let configured = log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    configured.max(LevelFilter::INFO)
}

/// Per-run log file path: `versentry-<YYYY-MM-DD-HH-MM-SS>-<unix nanos>.log`.
///
/// Returns `None` when `log_dir` is blank.
pub fn log_file_path(log_dir: &str) -> Option<PathBuf> {
    if log_dir.trim().is_empty() {
        return None;
    }
    let stamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    Some(Path::new(log_dir).join(format!("versentry-{stamp}-{nanos}.log")))
}
