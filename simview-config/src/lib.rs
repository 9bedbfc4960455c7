//! # simview configuration
//!
//! Layered configuration for the event log viewer.
//!
//! Hierarchy, later layers win:
//! 1. Default values
//! 2. `simview.yaml` in the working directory, if present
//! 3. `SIMVIEW_*` environment variables (`__` separates nested keys,
//!    e.g. `SIMVIEW_STREAM__CAPACITY=120`)
//! 4. Command-line flags, applied by the binary

#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use simview_core::SchemaChoice;
use validator::Validate;

mod error;
mod playback;
mod telemetry;
mod validation;

pub use error::ConfigError;
pub use playback::{PlaybackConfig, StreamConfig};
pub use telemetry::TelemetryConfig;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "simview.yaml";

const ENV_PREFIX: &str = "SIMVIEW_";

/// Top-level viewer configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct ViewerConfig {
    /// Event log to replay. Required, but usually given on the command line.
    #[serde(default)]
    pub input: Option<PathBuf>,

    /// Row layout of the log.
    #[serde(default)]
    pub schema: SchemaChoice,

    #[validate(nested)]
    #[serde(default)]
    pub stream: StreamConfig,

    #[validate(nested)]
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ViewerConfig {
    /// Load configuration from defaults, `simview.yaml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(ViewerConfig::default()));

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            figment = figment.merge(Yaml::file(DEFAULT_CONFIG_FILE));
        }

        Self::finish(figment)
    }

    /// Load configuration from a specific file instead of `simview.yaml`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        Self::finish(
            Figment::from(Serialized::defaults(ViewerConfig::default())).merge(Yaml::file(path)),
        )
    }

    fn finish(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// The configured event log, the one setting without a default.
    pub fn input_path(&self) -> Result<&Path, ConfigError> {
        self.input.as_deref().ok_or(ConfigError::MissingInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn default_config_validates() {
        let config = ViewerConfig::default();
        config.validate().expect("Default config should validate");
        assert_eq!(config.stream.capacity, 60);
        assert_eq!(config.playback.fps, 60);
        assert_eq!(config.schema, SchemaChoice::Auto);
    }

    #[test]
    fn input_is_required() {
        let config = ViewerConfig::default();
        assert!(matches!(config.input_path(), Err(ConfigError::MissingInput)));
    }

    #[test]
    fn yaml_file_then_environment_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                "input: logs/run.csv.gz\nschema: extended\nstream:\n  capacity: 30\n",
            )?;
            jail.set_env("SIMVIEW_STREAM__CAPACITY", "120");

            let config = ViewerConfig::load().expect("config should load");
            assert_eq!(config.input_path().unwrap(), Path::new("logs/run.csv.gz"));
            assert_eq!(config.schema, SchemaChoice::Extended);
            assert_eq!(config.stream.capacity, 120);
            assert_eq!(config.playback.fps, 60);
            Ok(())
        });
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        Jail::expect_with(|_| {
            let result = ViewerConfig::load_from_path("nope.yaml");
            assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
            Ok(())
        });
    }

    #[test]
    fn zero_capacity_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("viewer.yaml", "stream:\n  capacity: 0\n")?;
            let err = ViewerConfig::load_from_path("viewer.yaml").unwrap_err();
            assert!(matches!(err, ConfigError::Validation(_)));
            assert!(err.to_string().contains("capacity"));
            Ok(())
        });
    }

    #[test]
    fn bad_log_level_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("SIMVIEW_TELEMETRY__LOG_LEVEL", "loud");
            let err = ViewerConfig::load().unwrap_err();
            assert!(matches!(err, ConfigError::Validation(_)));
            Ok(())
        });
    }

    #[test]
    fn unknown_schema_name_fails_to_parse() {
        Jail::expect_with(|jail| {
            jail.set_env("SIMVIEW_SCHEMA", "wide");
            assert!(matches!(
                ViewerConfig::load(),
                Err(ConfigError::Parsing(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn frame_duration_follows_fps() {
        let playback = PlaybackConfig { fps: 50 };
        assert_eq!(playback.frame_duration().as_millis(), 20);
    }
}
