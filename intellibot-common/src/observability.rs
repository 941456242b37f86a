//! Logging bootstrap for the `intellibot` binary and the integration tests.
//!
//! Events go to a daily file `<app>.<YYYY-MM-DD>.log` and, when asked, to
//! stderr as well. Both sinks share one filter: `RUST_LOG` when set, else the
//! configured default. Only the first [`init_logging`] call installs anything.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

const LOG_DIR_ENV: &str = "INTELLIBOT_LOG_DIR";

struct Installed {
    path: PathBuf,
    _guard: WorkerGuard,
}

static INSTALLED: OnceLock<Installed> = OnceLock::new();

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Prefix of the log file and last component of the fallback directory.
    pub app_name: &'static str,
    pub log_dir: Option<PathBuf>,
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "intellibot",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// `log_dir`, else `$INTELLIBOT_LOG_DIR`, else `~/.local/share/<app_name>`.
    /// A leading `~/` is expanded against `$HOME`.
    pub fn resolve_dir(&self) -> PathBuf {
        self.resolve_dir_with(std::env::var_os(LOG_DIR_ENV).map(PathBuf::from))
    }

    fn resolve_dir_with(&self, env_dir: Option<PathBuf>) -> PathBuf {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        match self.log_dir.clone().or(env_dir) {
            Some(dir) => expand_home(&dir, home.as_deref()),
            None => match home {
                Some(home) => home.join(".local/share").join(self.app_name),
                None => PathBuf::from(self.app_name),
            },
        }
    }

    /// File the rolling appender writes to today.
    pub fn file_for_today(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.{}.log", self.app_name, Local::now().format("%Y-%m-%d")))
    }
}

fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

fn sink<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// Install the global subscriber and return today's log file.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(installed) = INSTALLED.get() {
        return Ok(installed.path.clone());
    }

    let dir = config.resolve_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.app_name)
        .filename_suffix("log")
        .build(&dir)
        .with_context(|| format!("opening log file in {}", dir.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let mut sinks = vec![sink(config.format, file_writer, false)];
    if config.emit_stderr {
        sinks.push(sink(config.format, std::io::stderr, true));
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(sinks)
        .with(filter)
        .try_init()
        .context("installing tracing subscriber")?;

    let path = config.file_for_today(&dir);
    let installed = INSTALLED.get_or_init(|| Installed {
        path,
        _guard: guard,
    });
    Ok(installed.path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_beats_env() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = LogConfig {
            log_dir: Some(tmp.path().to_path_buf()),
            ..LogConfig::default()
        };
        assert_eq!(cfg.resolve_dir_with(Some("/from/env".into())), tmp.path());
    }

    #[test]
    fn env_dir_is_used_when_config_has_none() {
        let cfg = LogConfig::default();
        assert_eq!(
            cfg.resolve_dir_with(Some("/var/log/intellibot".into())),
            PathBuf::from("/var/log/intellibot")
        );
    }

    #[test]
    fn fallback_dir_ends_with_app_name() {
        let cfg = LogConfig::default();
        assert!(cfg.resolve_dir_with(None).ends_with("intellibot"));
    }

    #[test]
    fn tilde_expands_against_home() {
        let home = Path::new("/home/ferris");
        assert_eq!(
            expand_home(Path::new("~/logs"), Some(home)),
            PathBuf::from("/home/ferris/logs")
        );
        assert_eq!(expand_home(Path::new("/abs"), Some(home)), PathBuf::from("/abs"));
        assert_eq!(expand_home(Path::new("~/logs"), None), PathBuf::from("~/logs"));
    }

    #[test]
    fn daily_file_name_matches_appender() {
        let cfg = LogConfig::default();
        let file = cfg.file_for_today(Path::new("/tmp/logs"));
        let name = file.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("intellibot."));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "intellibot.2026-01-01.log".len());
    }
}
