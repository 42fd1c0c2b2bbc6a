//! Subscriber setup for the Coil crates
//!
//! Component merges and splits are reported with `debug!`, rebinds and
//! skipped edits with `trace!`, and panicking hooks or listeners with
//! `warn!`. Nothing is rendered until a subscriber is installed, which is
//! what [`CoilSubscriberBuilder`] does.
//!
//! Console output is JSONL unless [`ConsoleFormat::Pretty`] is selected. An
//! optional [`FileConfig`] adds a second JSONL sink on disk. `RUST_LOG`, when
//! set, replaces the directives built from [`LogConfig`].
//!
//! ```no_run
//! use coil_logging::{CoilSubscriberBuilder, LogConfig};
//!
//! let _guard = CoilSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .with_target_level("coil_connections", "trace")
//!     .init();
//! ```

pub mod config;
pub mod error;

pub use config::{
    ConsoleConfig, ConsoleFormat, FileConfig, FilterConfig, JsonlConfig, LogConfig,
    RotationStrategy,
};
pub use error::{LoggingError, LoggingResult};
pub use tracing_appender::non_blocking::WorkerGuard;

use std::fs::{self, File};

use tracing::Dispatch;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layer, Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

type Filtered = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Filtered> + Send + Sync>;

/// Assembles a subscriber from a [`LogConfig`]
pub struct CoilSubscriberBuilder {
    config: LogConfig,
}

impl CoilSubscriberBuilder {
    /// Start from [`LogConfig::default`]
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Replace the whole config
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Level used when `RUST_LOG` is unset
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.level = level.into();
        self
    }

    /// Add a `target=level` directive
    pub fn with_target_level(mut self, target: impl Into<String>, level: impl Into<String>) -> Self {
        self.config.filters.targets.insert(target.into(), level.into());
        self
    }

    /// Turn the console sink on or off
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Add the JSONL file sink
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// Assemble the subscriber without installing it
    ///
    /// With a file sink a [`WorkerGuard`] is returned as well. Events stop
    /// reaching the file once it is dropped.
    pub fn build(self) -> LoggingResult<(Dispatch, Option<WorkerGuard>)> {
        let LogConfig {
            console,
            file,
            jsonl,
            ..
        } = &self.config;
        let filter = match EnvFilter::try_from_default_env() {
            Ok(from_env) => from_env,
            Err(_) => EnvFilter::try_new(self.config.directives())?,
        };

        let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
        if console.enabled {
            layers.push(match console.format {
                ConsoleFormat::Pretty => tracing_subscriber::fmt::layer()
                    .with_ansi(console.ansi)
                    .with_target(true)
                    .boxed(),
                ConsoleFormat::Json => json_layer(jsonl, std::io::stdout),
            });
        }

        let guard = match file {
            Some(sink) => {
                let (writer, guard) = file_writer(sink)?;
                layers.push(json_layer(jsonl, writer));
                Some(guard)
            }
            None => None,
        };

        let subscriber = Registry::default().with(filter).with(layers);
        Ok((Dispatch::new(subscriber), guard))
    }

    /// Install as the global default
    ///
    /// Fails with [`LoggingError::AlreadyInitialized`] on a second call.
    pub fn try_init(self) -> LoggingResult<Option<WorkerGuard>> {
        let (dispatch, guard) = self.build()?;
        dispatch.try_init()?;
        Ok(guard)
    }

    /// Like [`try_init`](Self::try_init), but failures go to stderr
    pub fn init(self) -> Option<WorkerGuard> {
        match self.try_init() {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("coil-logging: subscriber not installed: {e}");
                None
            }
        }
    }
}

impl Default for CoilSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn json_layer<W>(config: &JsonlConfig, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(config.current_span)
        .with_span_list(config.span_list)
        .flatten_event(config.flatten_events)
        .with_file(config.location)
        .with_line_number(config.location)
        .with_thread_ids(config.thread_info)
        .with_thread_names(config.thread_info)
        .with_writer(writer)
        .boxed()
}

/// Non-blocking writer for the file sink
fn file_writer(config: &FileConfig) -> LoggingResult<(NonBlocking, WorkerGuard)> {
    let Some(rotation) = config.rotation.rotation() else {
        fs::create_dir_all(&config.directory)?;
        let file = File::create(config.directory.join(format!("{}.log", config.prefix)))?;
        return Ok(tracing_appender::non_blocking(file));
    };

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(config.prefix.as_str())
        .filename_suffix("log");
    if let Some(max_files) = config.max_files {
        builder = builder.max_log_files(max_files);
    }
    let appender = builder.build(&config.directory)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the default config: info level, JSONL on stdout
pub fn init_default() {
    CoilSubscriberBuilder::new().init();
}

/// Install [`LogConfig::development`]
pub fn init_development() {
    CoilSubscriberBuilder::new()
        .with_config(LogConfig::development())
        .init();
}

/// Install [`LogConfig::testing`] unless a subscriber is already set
///
/// Meant to be called at the top of any test.
pub fn init_testing() {
    let _ = CoilSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = CoilSubscriberBuilder::default();
        assert_eq!(builder.config.level, "info");
        assert_eq!(builder.config.console.format, ConsoleFormat::Json);
    }

    #[test]
    fn test_builder_with_config() {
        let builder = CoilSubscriberBuilder::new().with_config(LogConfig::development());
        assert_eq!(builder.config.level, "debug");
        assert_eq!(builder.config.console.format, ConsoleFormat::Pretty);
    }

    #[test]
    fn test_builder_with_level_and_targets() {
        let builder = CoilSubscriberBuilder::new()
            .with_level("trace")
            .with_target_level("coil_core", "warn");
        assert_eq!(builder.config.directives(), "trace,coil_core=warn");
    }

    #[test]
    fn test_builder_with_console() {
        let builder = CoilSubscriberBuilder::new().with_console(false);
        assert!(!builder.config.console.enabled);
    }

    #[test]
    fn test_file_output_writes_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let (dispatch, guard) = CoilSubscriberBuilder::new()
            .with_console(false)
            .with_level("warn")
            .with_file_output(FileConfig {
                directory: dir.path().to_path_buf(),
                prefix: "test".to_string(),
                rotation: RotationStrategy::Never,
                max_files: None,
            })
            .build()
            .unwrap();
        assert!(guard.is_some());

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::warn!(wire = "W1", "Listener panicked");
        });
        drop(guard);

        let contents = std::fs::read_to_string(dir.path().join("test.log")).unwrap();
        let line = contents
            .lines()
            .find(|line| line.contains("Listener panicked"))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["wire"], "W1");
    }

    #[test]
    fn test_init_testing_is_idempotent() {
        init_testing();
        init_testing();
        assert!(
            CoilSubscriberBuilder::new()
                .with_config(LogConfig::testing())
                .try_init()
                .is_err()
        );
    }
}
