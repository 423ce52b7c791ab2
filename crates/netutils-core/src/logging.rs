//! Tracing setup for the CLI: append to a log file under the XDG state dir,
//! or write to stderr when that is not possible.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Overrides the directory holding `netutils.log`.
pub const LOG_DIR_ENV: &str = "NETUTILS_LOG_DIR";
const LOG_FILE_NAME: &str = "netutils.log";
const DEFAULT_FILTER: &str = "info,netutils=debug,netutils_core=debug";

/// `$NETUTILS_LOG_DIR/netutils.log`, else `~/.local/state/netutils/netutils.log`.
pub fn log_file_path() -> Result<PathBuf> {
    let dir = match std::env::var_os(LOG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => xdg::BaseDirectories::with_prefix("netutils")?
            .get_state_home()
            .join("netutils"),
    };
    Ok(dir.join(LOG_FILE_NAME))
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn install(writer: BoxMakeWriter) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))
}

/// Installs the file logger. Errors (unwritable state dir, subscriber already
/// set) are returned so the caller can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = open_log_file(&path)?;
    // Events from the blocking pool and the download thread share one handle.
    install(BoxMakeWriter::new(Arc::new(file)))?;
    tracing::info!("netutils logging initialized at {}", path.display());
    Ok(())
}

/// Stderr-only logging; never fails.
pub fn init_logging_stderr() {
    let _ = install(BoxMakeWriter::new(std::io::stderr));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_honours_override() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var(LOG_DIR_ENV, dir.path());
        let path = log_file_path().unwrap();
        std::env::remove_var(LOG_DIR_ENV);
        assert_eq!(path, dir.path().join("netutils.log"));
    }

    #[test]
    fn log_file_is_created_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("netutils.log");
        open_log_file(&path).unwrap();
        assert!(path.is_file());
    }
}
