//! Configuration module.
//!
//! Handles loading, validating, and merging `searchprep.toml`. Stock defaults
//! are serialized to a TOML table and the user's file is merged on top, so a
//! config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [normalize]
//! min_width = 200            # Smaller images are upscaled
//! min_height = 200
//! max_width = 1024           # Larger images are downscaled
//! max_height = 1024
//! max_byte_size = 1000000    # Larger files are shrunk until they fit
//! jpeg_quality = 90          # JPEG quality for every re-encode (1-100)
//! max_size_attempts = 64     # Give up shrinking after this many encodes
//!
//! [thumbnail]
//! max_size = 142             # Longer edge of thumbnails
//!
//! [processing]
//! max_processes = 4          # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Constraints, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILENAME: &str = "searchprep.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `searchprep.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrepConfig {
    /// Normalization envelope (resolution floor/ceiling, byte budget, quality).
    pub normalize: NormalizeConfig,
    /// Thumbnail settings.
    pub thumbnail: ThumbnailConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl PrepConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = &self.normalize;
        if n.jpeg_quality == 0 || n.jpeg_quality > 100 {
            return Err(ConfigError::Validation(
                "normalize.jpeg_quality must be 1-100".into(),
            ));
        }
        if n.min_width == 0 || n.min_height == 0 {
            return Err(ConfigError::Validation(
                "normalize.min_width and normalize.min_height must be non-zero".into(),
            ));
        }
        if n.min_width > n.max_width || n.min_height > n.max_height {
            return Err(ConfigError::Validation(
                "normalize minimum resolution must not exceed the maximum".into(),
            ));
        }
        if n.max_byte_size == 0 {
            return Err(ConfigError::Validation(
                "normalize.max_byte_size must be non-zero".into(),
            ));
        }
        if n.max_size_attempts == 0 {
            return Err(ConfigError::Validation(
                "normalize.max_size_attempts must be non-zero".into(),
            ));
        }
        if self.thumbnail.max_size == 0 {
            return Err(ConfigError::Validation(
                "thumbnail.max_size must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// The pipeline constraints these settings describe.
    pub fn constraints(&self) -> Constraints {
        let n = &self.normalize;
        Constraints {
            min_width: n.min_width,
            min_height: n.min_height,
            max_width: n.max_width,
            max_height: n.max_height,
            max_byte_size: n.max_byte_size,
            thumbnail_max_size: self.thumbnail.max_size,
            quality: Quality::new(n.jpeg_quality),
            max_size_attempts: n.max_size_attempts,
        }
    }
}

/// Normalization envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeConfig {
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    /// Byte budget for the encoded image.
    pub max_byte_size: u64,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub jpeg_quality: u32,
    /// Maximum number of encodes while shrinking to the byte budget.
    pub max_size_attempts: u32,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        let c = Constraints::default();
        Self {
            min_width: c.min_width,
            min_height: c.min_height,
            max_width: c.max_width,
            max_height: c.max_height,
            max_byte_size: c.max_byte_size,
            jpeg_quality: c.quality.value() as u32,
            max_size_attempts: c.max_size_attempts,
        }
    }
}

/// Thumbnail settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailConfig {
    /// Longer edge of generated thumbnails, in pixels.
    pub max_size: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_size: Constraints::default().thumbnail_max_size,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel normalization workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(PrepConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PrepConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PrepConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Parse config from TOML text.
pub fn parse_config(content: &str) -> Result<PrepConfig, ConfigError> {
    let value: toml::Value = toml::from_str(content)?;
    resolve_config(Some(value))
}

/// Load config from `path`.
///
/// A missing file yields the stock defaults when `required` is false (the
/// implicit `searchprep.toml` lookup) and an I/O error otherwise.
pub fn load_config(path: &Path, required: bool) -> Result<PrepConfig, ConfigError> {
    if !required && !path.exists() {
        return resolve_config(None);
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `searchprep.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# searchprep configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Normalization envelope
# ---------------------------------------------------------------------------
[normalize]
# Images smaller than this are upscaled (aspect ratio preserved).
min_width = 200
min_height = 200

# Images larger than this are downscaled (aspect ratio preserved).
max_width = 1024
max_height = 1024

# Encoded images larger than this many bytes are shrunk until they fit.
max_byte_size = 1000000

# JPEG quality for every re-encode (1 = worst, 100 = best).
jpeg_quality = 90

# Give up shrinking an image after this many encodes.
max_size_attempts = 64

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnail]
# Longer edge of generated thumbnails, in pixels.
max_size = 142

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel normalization workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
