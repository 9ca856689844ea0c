use crate::error::LoggingError;
use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Log file for the current process inside `log_dir`
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("harvest-{}.log", std::process::id()))
}

/// Install the global logger
///
/// `RUST_LOG` picks the filter, defaulting to `info`. Output goes to a
/// per-process file under `log_dir` unless `to_stderr` is set. Returns the
/// log file path when one is used.
pub fn init(log_dir: &Path, to_stderr: bool) -> Result<Option<PathBuf>, LoggingError> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_secs();

    if to_stderr {
        builder.target(Target::Stderr).try_init()?;
        return Ok(None);
    }

    let path = log_file_path(log_dir);
    let file = fs::create_dir_all(log_dir)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&path))
        .map_err(|source| LoggingError::Open {
            path: path.clone(),
            source,
        })?;

    builder.target(Target::Pipe(Box::new(file))).try_init()?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_is_per_process() {
        let path = log_file_path(Path::new("logs"));
        assert_eq!(path.parent(), Some(Path::new("logs")));
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(format!("harvest-{}.log", std::process::id()).as_str())
        );
    }

    #[test]
    fn test_unwritable_log_dir_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("logs");
        fs::write(&blocker, "not a directory").unwrap();

        let result = init(&blocker, false);
        assert!(matches!(result, Err(LoggingError::Open { .. })));
    }
}
