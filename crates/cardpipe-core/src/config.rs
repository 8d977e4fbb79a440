use anyhow::Result;
use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

use crate::constants::{
    CONFIG_FILE, DEFAULT_FLUSH_THRESHOLD_BYTES, DEFAULT_SPILL_THRESHOLD_BYTES, ENV_PREFIX,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub limits: LimitsConfig,
    pub format: FormatConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum bytes read from one import stream. Zero or negative disables the limit.
    pub max_size_bytes: i64,
    pub flush_threshold_bytes: usize,
    pub spill_threshold_bytes: usize,
}

impl LimitsConfig {
    /// ## Summary
    /// Returns the byte limit, or `None` when the configured value is non-positive.
    #[must_use]
    pub fn max_size(&self) -> Option<u64> {
        u64::try_from(self.max_size_bytes).ok().filter(|max| *max > 0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormatConfig {
    /// vCard version used for export and as the import validation fallback.
    pub version: String,
    pub strict: bool,
    /// Run post-decode validation on imported cards.
    pub validate: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Returns a builder pre-populated with every default value.
    ///
    /// ## Errors
    /// Returns an error if a default cannot be registered.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("limits.max_size_bytes", 0)?
            .set_default(
                "limits.flush_threshold_bytes",
                u64::try_from(DEFAULT_FLUSH_THRESHOLD_BYTES)?,
            )?
            .set_default(
                "limits.spill_threshold_bytes",
                u64::try_from(DEFAULT_SPILL_THRESHOLD_BYTES)?,
            )?
            .set_default("format.version", "4.0")?
            .set_default("format.strict", false)?
            .set_default("format.validate", true)?
            .set_default("logging.level", "info")?)
    }

    /// ## Summary
    /// Loads configuration from defaults, `cardpipe.toml` and `CARDPIPE__*` environment
    /// variables. Environment variables take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Self::defaults()?
            // TOML file
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            // Environment
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Loads configuration from defaults overlaid with an inline TOML document.
    ///
    /// ## Errors
    /// Returns an error if the document is not valid TOML or does not deserialize.
    pub fn from_toml_str(document: &str) -> Result<Self> {
        Ok(Self::defaults()?
            .add_source(config::File::from_str(document, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::trace!(error = %e, "No .env file loaded");
    }

    Settings::load()
}
