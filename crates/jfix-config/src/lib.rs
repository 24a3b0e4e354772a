//! Engine configuration loaded from `jfix.toml`, and the tracing bootstrap.
//!
//! ```toml
//! [clean_up]
//! qualify_field_access = true
//! change_non_static_access_to_static = true
//!
//! [format]
//! indent_width = 2
//!
//! [logging]
//! level = "debug"
//! json = true
//! ```

mod diagnostics;

use std::path::Path;
use std::sync::Once;

use jfix_fix::{CodeStyleOptions, FormatOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;

pub use diagnostics::{ConfigDiagnostics, ConfigWarning};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JfixConfig {
    /// Which code-style clean-ups run.
    #[serde(default)]
    pub clean_up: CodeStyleOptions,

    /// Layout of generated code.
    #[serde(default)]
    pub format: FormatOptions,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr. When off, events are filtered but discarded.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// The effective filter: the configured level, with `RUST_LOG` merged in when set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` quotes the offending source line.
        ConfigError::Toml(err.message().to_string())
    }
}

const LINE_SEPARATORS: &[&str] = &["\n", "\r\n", "\r"];

impl JfixConfig {
    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_from_path_with_diagnostics(path).map(|(config, _)| config)
    }

    /// Load a config file from TOML, reporting unknown keys and replaced values.
    pub fn load_from_path_with_diagnostics(
        path: impl AsRef<Path>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let loaded = Self::load_from_str_with_diagnostics(&text)?;
        tracing::debug!(
            target: "jfix.config",
            path = %path.display(),
            unknown_keys = loaded.1.unknown_keys.len(),
            "loaded config"
        );
        Ok(loaded)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Self::load_from_str_with_diagnostics(text).map(|(config, _)| config)
    }

    pub fn load_from_str_with_diagnostics(
        text: &str,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let (mut config, unknown_keys) =
            diagnostics::deserialize_toml_with_unknown_keys::<JfixConfig>(text)?;
        let mut diagnostics = ConfigDiagnostics {
            unknown_keys,
            ..ConfigDiagnostics::default()
        };
        config.normalize(&mut diagnostics);
        for key in &diagnostics.unknown_keys {
            tracing::warn!(target: "jfix.config", key = %key, "ignoring unknown config key");
        }
        Ok((config, diagnostics))
    }

    /// Replaces values the engine cannot use by their defaults.
    fn normalize(&mut self, diagnostics: &mut ConfigDiagnostics) {
        let defaults = FormatOptions::default();
        if self.format.indent_width == 0 && !self.format.use_tabs {
            diagnostics.warnings.push(ConfigWarning::InvalidValue {
                toml_path: "format.indent_width".to_string(),
                message: format!("must be at least 1; using {}", defaults.indent_width),
            });
            self.format.indent_width = defaults.indent_width;
        }
        if let Some(sep) = &self.format.line_separator {
            if !LINE_SEPARATORS.contains(&sep.as_str()) {
                diagnostics.warnings.push(ConfigWarning::InvalidValue {
                    toml_path: "format.line_separator".to_string(),
                    message: "must be \\n, \\r\\n or \\r; keeping the unit's separator".to_string(),
                });
                self.format.line_separator = None;
            }
        }
    }

    pub fn code_style_options(&self) -> CodeStyleOptions {
        self.clean_up
    }

    pub fn format_options(&self) -> FormatOptions {
        self.format.clone()
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs the global `tracing` subscriber described by `config`.
///
/// Only the first call installs anything; returns whether this call did.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let mut installed = false;
    TRACING_INIT.call_once(|| {
        let writer = if !config.stderr {
            BoxMakeWriter::new(std::io::sink)
        } else if cfg!(debug_assertions) {
            // Keeps `cargo test` output captured.
            BoxMakeWriter::new(tracing_subscriber::fmt::writer::TestWriter::with_stderr)
        } else {
            BoxMakeWriter::new(std::io::stderr)
        };

        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry()
            .with(config.env_filter())
            .with(layer);
        installed = tracing::subscriber::set_global_default(subscriber).is_ok();
        if installed {
            tracing::debug!(target: "jfix.config", json = config.json, "tracing initialized");
        }
    });
    installed
}
