use anyhow::{Context, Result};
use clap::Parser;
use intellibot_common::IntellibotError;
use intellibot_common::observability::{LogConfig, LogFormat, init_logging};
use intellibot_config::{IntellibotConfig, IntellibotConfigLoader, LoggingConfig};
use shell::Shell;
use std::path::PathBuf;
use wiring::build_from_config;

mod command;
mod shell;
mod styles;
mod wiring;

#[derive(Debug, Parser)]
#[command(name = "intellibot", version, about = "IntelliBot – Smart Search Assistant")]
struct Cli {
    /// YAML config file; skipped when absent
    #[arg(long, env = "INTELLIBOT_CONFIG", default_value = "intellibot.yaml")]
    config: PathBuf,

    /// Also write logs to stderr
    #[arg(long)]
    stderr_logs: bool,
}

fn log_config(logging: &LoggingConfig, force_stderr: bool) -> LogConfig {
    LogConfig {
        log_dir: logging.dir.clone(),
        emit_stderr: logging.emit_stderr || force_stderr,
        format: match logging.format {
            intellibot_config::LogFormat::Text => LogFormat::Text,
            intellibot_config::LogFormat::Json => LogFormat::Json,
        },
        default_filter: logging.filter.clone(),
        ..LogConfig::default()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let cfg: IntellibotConfig = IntellibotConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()
        .map_err(|e| IntellibotError::Config(e.to_string()))
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // 2) Logging
    let log_path = init_logging(log_config(&cfg.logging, cli.stderr_logs))?;
    tracing::info!(
        target: "app",
        config = %cli.config.display(),
        log = %log_path.display(),
        "app.start"
    );

    // 3) Wire sources and run the shell
    let (session, images) = build_from_config(&cfg)?;
    Shell::new(session, images).run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["intellibot"]).unwrap();
        assert!(!cli.stderr_logs);
        assert!(cli.config.ends_with("intellibot.yaml") || std::env::var("INTELLIBOT_CONFIG").is_ok());
    }

    #[test]
    fn stderr_flag_forces_stderr() {
        let logging = LoggingConfig::default();
        assert!(!log_config(&logging, false).emit_stderr);
        assert!(log_config(&logging, true).emit_stderr);
    }

    #[test]
    fn json_format_carries_over() {
        let logging = LoggingConfig {
            format: intellibot_config::LogFormat::Json,
            filter: "debug".into(),
            ..LoggingConfig::default()
        };
        let cfg = log_config(&logging, false);
        assert_eq!(cfg.format, LogFormat::Json);
        assert_eq!(cfg.default_filter, "debug");
        assert_eq!(cfg.app_name, "intellibot");
    }
}
