//! Service configuration.
//!
//! Both structs deserialize from partial documents; missing fields take their
//! defaults.

use crate::error::{GeoError, Result};
use serde::{Deserialize, Serialize};

/// Environment variable toggling the post-parse validity check.
pub const ENV_VALIDATE_ON_PARSE: &str = "GEOSAFE_VALIDATE_ON_PARSE";
/// Environment variable for GeoJSON coordinate precision.
pub const ENV_COORD_PRECISION: &str = "GEOSAFE_COORD_PRECISION";
/// Environment variable enabling strict GeoJSON coordinates.
pub const ENV_STRICT_COORDINATES: &str = "GEOSAFE_STRICT_COORDINATES";

/// Largest precision that still carries information for an `f64`.
pub const MAX_PRECISION: usize = 17;

/// GeoJSON to WKT conversion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Fractional digits printed per coordinate.
    /// Default: 6
    pub precision: usize,

    /// Fail on malformed vertices instead of dropping them.
    /// Default: false
    pub strict_coordinates: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            precision: 6,
            strict_coordinates: false,
        }
    }
}

impl NormalizeConfig {
    /// Set coordinate precision.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Enable or disable strict coordinate handling.
    pub fn with_strict_coordinates(mut self, strict: bool) -> Self {
        self.strict_coordinates = strict;
        self
    }
}

/// Configuration for a [`GeoService`](crate::GeoService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Run the engine validity check after every parse.
    /// Default: true
    pub validate_on_parse: bool,

    /// GeoJSON normalization settings.
    pub normalize: NormalizeConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            validate_on_parse: true,
            normalize: NormalizeConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Enable or disable the post-parse validity check.
    pub fn with_validate_on_parse(mut self, validate: bool) -> Self {
        self.validate_on_parse = validate;
        self
    }

    /// Set normalization settings.
    pub fn with_normalize(mut self, normalize: NormalizeConfig) -> Self {
        self.normalize = normalize;
        self
    }

    /// Defaults overridden by `GEOSAFE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_VALIDATE_ON_PARSE) {
            config.validate_on_parse = parse_bool(ENV_VALIDATE_ON_PARSE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_COORD_PRECISION) {
            config.normalize.precision = raw.trim().parse().map_err(|_| {
                GeoError::Config(format!("{}: expected an integer, got '{}'", ENV_COORD_PRECISION, raw))
            })?;
        }
        if let Some(raw) = lookup(ENV_STRICT_COORDINATES) {
            config.normalize.strict_coordinates = parse_bool(ENV_STRICT_COORDINATES, &raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.normalize.precision > MAX_PRECISION {
            return Err(GeoError::Config(format!(
                "coordinate precision {} exceeds maximum {}",
                self.normalize.precision, MAX_PRECISION
            )));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(GeoError::Config(format!(
            "{}: expected a boolean, got '{}'",
            key, raw
        ))),
    }
}
