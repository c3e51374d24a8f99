use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILTER_ENV: &str = "CHATVIEW_LOG";
const DEFAULT_FILTER: &str = "chatview=info";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LogTarget {
    /// The TUI owns stdout, so it logs to a file.
    File(PathBuf),
    Stderr,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    OpenFile { path: String, source: io::Error },

    #[error("invalid {LOG_FILTER_ENV} filter: {0}")]
    Filter(String),

    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

pub fn init_logging(target: &LogTarget) -> Result<(), LoggingError> {
    let filter = match std::env::var(LOG_FILTER_ENV) {
        Ok(value) if !value.trim().is_empty() => {
            EnvFilter::try_new(value).map_err(|error| LoggingError::Filter(error.to_string()))?
        }
        _ => EnvFilter::new(DEFAULT_FILTER),
    };

    let registry = tracing_subscriber::registry().with(filter);
    match target {
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            registry
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(true)
                        .with_writer(Arc::new(file)),
                )
                .try_init()
                .map_err(|error| LoggingError::Install(error.to_string()))
        }
        LogTarget::Stderr => registry
            .with(fmt::layer().with_writer(io::stderr))
            .try_init()
            .map_err(|error| LoggingError::Install(error.to_string())),
    }
}

pub fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let to_error = |source: io::Error| LoggingError::OpenFile {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(to_error)?;
        }
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn open_log_file_creates_parent_dirs_and_appends() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("chatview.log");

        let mut first = open_log_file(&path).expect("open");
        writeln!(first, "one").expect("write");
        drop(first);

        let mut second = open_log_file(&path).expect("reopen");
        writeln!(second, "two").expect("write");
        drop(second);

        let text = fs::read_to_string(&path).expect("read");
        assert_eq!(text, "one\ntwo\n");
    }

    #[test]
    fn open_log_file_reports_path_on_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").expect("write");

        let error = open_log_file(&blocker.join("child.log")).expect_err("should fail");
        assert!(error.to_string().contains("child.log"));
    }
}
