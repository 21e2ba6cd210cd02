// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Logging configuration for the command-line tools
//!
//! Two modes: human-readable output on stderr (the default for an
//! interactive run) and structured bunyan output appended to a file.  The
//! configuration is built from command-line flags rather than a config
//! file, so these types carry no serde machinery.

use slog::o;
use slog::Drain;
use slog::Level;
use slog::Logger;
use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

/// Error returned when the requested logging configuration cannot be set
/// up (most commonly: the log file could not be opened)
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct InitError(pub String);

/// How log messages should be emitted
#[derive(Clone, Debug)]
pub enum ConfigLogging {
    StderrTerminal {
        level: ConfigLoggingLevel,
    },
    File {
        level: ConfigLoggingLevel,
        path: PathBuf,
        if_exists: ConfigLoggingIfExists,
    },
}

/// What to do if the requested log file already exists
#[derive(Clone, Copy, Debug)]
pub enum ConfigLoggingIfExists {
    Fail,
    Truncate,
    Append,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigLoggingLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl FromStr for ConfigLoggingLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "trace" => Ok(ConfigLoggingLevel::Trace),
            "debug" => Ok(ConfigLoggingLevel::Debug),
            "info" => Ok(ConfigLoggingLevel::Info),
            "warn" => Ok(ConfigLoggingLevel::Warn),
            "error" => Ok(ConfigLoggingLevel::Error),
            "critical" => Ok(ConfigLoggingLevel::Critical),
            _ => Err(format!(
                "unsupported log level {:?} (expected one of \"trace\", \
                 \"debug\", \"info\", \"warn\", \"error\", \"critical\")",
                value
            )),
        }
    }
}

impl From<&ConfigLoggingLevel> for Level {
    fn from(config_level: &ConfigLoggingLevel) -> Level {
        match config_level {
            ConfigLoggingLevel::Trace => Level::Trace,
            ConfigLoggingLevel::Debug => Level::Debug,
            ConfigLoggingLevel::Info => Level::Info,
            ConfigLoggingLevel::Warn => Level::Warning,
            ConfigLoggingLevel::Error => Level::Error,
            ConfigLoggingLevel::Critical => Level::Critical,
        }
    }
}

impl ConfigLogging {
    /// Creates the root logger for the process based on this
    /// configuration.  `name` identifies the program in structured
    /// output and must be a static string because the drain keeps it
    /// for the life of the process.
    pub fn to_logger(&self, name: &'static str) -> Result<Logger, InitError> {
        match self {
            ConfigLogging::StderrTerminal { level } => {
                let decorator = slog_term::TermDecorator::new().build();
                let drain =
                    slog_term::FullFormat::new(decorator).build().fuse();
                Ok(async_root_logger(level, drain))
            }

            ConfigLogging::File { level, path, if_exists } => {
                let mut open_options = OpenOptions::new();
                open_options.write(true);
                open_options.create(true);

                match if_exists {
                    ConfigLoggingIfExists::Fail => {
                        open_options.create_new(true);
                    }
                    ConfigLoggingIfExists::Append => {
                        open_options.append(true);
                    }
                    ConfigLoggingIfExists::Truncate => {
                        open_options.truncate(true);
                    }
                }

                let drain = log_drain_for_file(&open_options, path, name)?;
                Ok(async_root_logger(level, drain))
            }
        }
    }
}

// We use an async drain to take care of synchronization.  The other
// drains use a std::sync::Mutex, which is not futures-aware and would
// foul up the executor.
fn async_root_logger<T>(level: &ConfigLoggingLevel, drain: T) -> Logger
where
    T: slog::Drain + Send + 'static,
    <T as slog::Drain>::Err: std::fmt::Debug,
{
    let pid = std::process::id();
    let level_drain = slog::LevelFilter(drain, Level::from(level)).fuse();
    let async_drain = slog_async::Async::new(level_drain).build().fuse();
    Logger::root(async_drain, o!("pid" => pid))
}

fn log_drain_for_file(
    open_options: &OpenOptions,
    path: &Path,
    name: &'static str,
) -> Result<slog::Fuse<slog_json::Json<std::fs::File>>, InitError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            InitError(format!("open log file \"{}\": {}", path.display(), e))
        })?;
    }

    let file = open_options.open(path).map_err(|e| {
        InitError(format!("open log file \"{}\": {}", path.display(), e))
    })?;

    // Record a message to stderr so that a reader who does not already
    // know how logging is configured knows where the rest of the log
    // messages went.
    eprintln!("note: configured to log to \"{}\"", path.display());
    Ok(slog_bunyan::with_name(name, file).build().fuse())
}

#[cfg(test)]
mod test {
    use super::ConfigLogging;
    use super::ConfigLoggingIfExists;
    use super::ConfigLoggingLevel;
    use slog::info;
    use std::fs;
    use std::path::PathBuf;

    // Make a unique path under the temporary directory, mirroring how the
    // program name and pid keep concurrent test runs apart.
    fn temp_log_path(label: &str) -> PathBuf {
        let mut pathbuf = std::env::temp_dir();
        pathbuf.push(format!(
            "regrant-logging-test.{}.{}.log",
            std::process::id(),
            label
        ));
        pathbuf
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(
            "warn".parse::<ConfigLoggingLevel>().unwrap(),
            ConfigLoggingLevel::Warn
        );
        assert_eq!(
            "trace".parse::<ConfigLoggingLevel>().unwrap(),
            ConfigLoggingLevel::Trace
        );
        let error = "verbose".parse::<ConfigLoggingLevel>().unwrap_err();
        assert!(error.contains("unsupported log level \"verbose\""));
    }

    #[test]
    fn test_log_file_bad_path() {
        // A directory cannot be opened for writing.
        let config = ConfigLogging::File {
            level: ConfigLoggingLevel::Info,
            path: std::env::temp_dir(),
            if_exists: ConfigLoggingIfExists::Append,
        };
        let error = config.to_logger("test-logger").unwrap_err();
        assert!(error.to_string().starts_with("open log file \""));
    }

    #[test]
    fn test_log_file_if_exists_fail() {
        let path = temp_log_path("if_exists_fail");
        fs::write(&path, "already here\n").unwrap();
        let config = ConfigLogging::File {
            level: ConfigLoggingLevel::Info,
            path: path.clone(),
            if_exists: ConfigLoggingIfExists::Fail,
        };
        let error = config.to_logger("test-logger").unwrap_err();
        assert!(error.to_string().starts_with("open log file \""));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_log_file_records() {
        let path = temp_log_path("records");
        let config = ConfigLogging::File {
            level: ConfigLoggingLevel::Info,
            path: path.clone(),
            if_exists: ConfigLoggingIfExists::Truncate,
        };
        let log = config.to_logger("test-logger").unwrap();
        info!(log, "gruntled"; "which" => "entirely");

        // Dropping the logger flushes the async drain.
        drop(log);
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("gruntled"));
        assert!(contents.contains("test-logger"));
        fs::remove_file(&path).unwrap();
    }
}
