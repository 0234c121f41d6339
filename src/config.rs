//! Program settings with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Environment variables: `ARGSPEC_*` prefix
//!
//! These settings shape the program (log filter, colors), never argument values.

use clap::ColorChoice;
use config::{Config, Environment};
use serde::{Deserialize, Serialize};

use crate::cli::{CliError, CliResult};

/// Environment prefix read by [`Settings::load`].
pub const ENV_PREFIX: &str = "ARGSPEC";

/// When to color help and usage output.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl From<ColorMode> for ColorChoice {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// `tracing` filter directive (e.g. `warn`, `argspec=debug`)
    pub log: String,
    pub color: ColorMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log: "warn".to_string(),
            color: ColorMode::Auto,
        }
    }
}

impl Settings {
    /// Load settings: compiled defaults, overridden by `ARGSPEC_*` variables.
    pub fn load() -> CliResult<Self> {
        Self::load_with_prefix(ENV_PREFIX)
    }

    /// Load settings reading environment variables under `prefix`.
    pub fn load_with_prefix(prefix: &str) -> CliResult<Self> {
        let defaults = Self::default();
        let config = Config::builder()
            .set_default("log", defaults.log)
            .map_err(settings_err)?
            .set_default("color", "auto")
            .map_err(settings_err)?
            .add_source(Environment::with_prefix(prefix))
            .build()
            .map_err(settings_err)?;

        config.try_deserialize().map_err(settings_err)
    }
}

fn settings_err(e: config::ConfigError) -> CliError {
    CliError::Settings {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_env_when_loading_then_uses_defaults() {
        let settings = Settings::load_with_prefix("ARGSPEC_UNSET_PREFIX").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn given_env_overrides_when_loading_then_env_wins() {
        std::env::set_var("ARGSPEC_CFGTEST_COLOR", "never");
        std::env::set_var("ARGSPEC_CFGTEST_LOG", "argspec=debug");

        let settings = Settings::load_with_prefix("ARGSPEC_CFGTEST").unwrap();

        assert_eq!(settings.color, ColorMode::Never);
        assert_eq!(settings.log, "argspec=debug");
    }

    #[test]
    fn given_bad_color_when_loading_then_errors() {
        std::env::set_var("ARGSPEC_BADCOLOR_COLOR", "sometimes");
        let err = Settings::load_with_prefix("ARGSPEC_BADCOLOR").unwrap_err();
        assert!(matches!(err, CliError::Settings { .. }));
    }
}
