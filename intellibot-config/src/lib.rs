//! Loader for IntelliBot configuration with YAML + environment overlays.
//!
//! Every field has a default, so the bot runs with no file at all. Sources
//! merge in the order they are added; `INTELLIBOT__SECTION__KEY` environment
//! variables win over files (e.g. `INTELLIBOT__SEARCH__MAX_SNIPPETS=5`).
//! String values may reference other environment variables with `${VAR}`.
//!
//! ```yaml
//! version: "1"
//! reference:
//!   endpoint: https://en.wikipedia.org/w/api.php
//!   user_agent: IntelliBot/0.1.0 (terminal search assistant)
//!   sentences: 2
//!   max_options: 5
//! search:
//!   endpoint: https://www.google.com/
//!   user_agent: Mozilla/5.0
//!   max_snippets: 3
//!   max_images: 3
//! images:
//!   timeout_secs: 5
//!   cache: true
//! http:
//!   timeout_secs: 15
//!   retries: 0
//! logging:
//!   dir: ${HOME}/.local/share/intellibot
//!   format: text
//!   emit_stderr: false
//!   filter: info
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IntellibotConfig {
    pub version: Option<String>,
    pub reference: ReferenceConfig,
    pub search: SearchConfig,
    pub images: ImageConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Encyclopedia summary service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    pub endpoint: String,
    /// Wikimedia rejects API calls that carry no identifying agent.
    pub user_agent: String,
    /// Sentences requested for a summary.
    pub sentences: u32,
    /// Cap on alternatives listed for an ambiguous title.
    pub max_options: usize,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://en.wikipedia.org/w/api.php".into(),
            user_agent: concat!("IntelliBot/", env!("CARGO_PKG_VERSION"), " (terminal search assistant)")
                .into(),
            sentences: 2,
            max_options: 5,
        }
    }
}

/// Third-party search engine scraped for snippets and images.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub max_snippets: usize,
    pub max_images: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.google.com/".into(),
            user_agent: "Mozilla/5.0".into(),
            max_snippets: 3,
            max_images: 3,
        }
    }
}

/// Render-time image re-fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub timeout_secs: u64,
    pub cache: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            cache: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub retries: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            retries: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            emit_stderr: false,
            filter: "info".into(),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct IntellibotConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for IntellibotConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl IntellibotConfigLoader {
    /// Start empty; `INTELLIBOT__` env overrides are layered on top in [`Self::load`].
    ///
    /// ```
    /// use intellibot_config::IntellibotConfigLoader;
    ///
    /// let config = IntellibotConfigLoader::new().load().expect("defaults load");
    ///
    /// assert_eq!(config.reference.sentences, 2);
    /// assert_eq!(config.search.max_snippets, 3);
    /// assert_eq!(config.images.timeout_secs, 5);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when it does not exist.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use intellibot_config::{IntellibotConfigLoader, LogFormat};
    ///
    /// let cfg = IntellibotConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// version: "test"
    /// search:
    ///   max_images: 1
    /// logging:
    ///   format: json
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.version.as_deref(), Some("test"));
    /// assert_eq!(cfg.search.max_images, 1);
    /// assert_eq!(cfg.search.max_snippets, 3);
    /// assert_eq!(cfg.logging.format, LogFormat::Json);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// `${VAR}` placeholders are expanded after merging, so a file can point
    /// at values that only exist in the environment.
    pub fn load(self) -> Result<IntellibotConfig, ConfigError> {
        // Added last so the environment wins over every file or snippet.
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("INTELLIBOT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: IntellibotConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
