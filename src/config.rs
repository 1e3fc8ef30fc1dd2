//! # Configuration
//!
//! Settings for the command-line front-end, stored as JSON.
//!
//! Lookup order:
//!
//! 1. The file named by `--config`, which must exist.
//! 2. `<config dir>/otpbridge/config.json` (via `dirs::config_dir`), if present.
//! 3. Built-in defaults.
//!
//! Environment overrides are applied on top:
//!
//! - `OTPBRIDGE_QR_FORMAT` – `terminal`, `png` or `svg`
//! - `OTPBRIDGE_QR_SIZE` – minimum edge length in pixels

use std::fs;
use std::path::{Path, PathBuf};

use otpbridge_otp::otp::qr::{QrCodeRenderer, QrFormat, DEFAULT_QR_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const ENV_QR_FORMAT: &str = "OTPBRIDGE_QR_FORMAT";
pub const ENV_QR_SIZE: &str = "OTPBRIDGE_QR_SIZE";

/// Front-end settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// How QR codes are rendered when no output file is given.
    pub qr_format: QrFormat,
    /// Minimum QR edge length in pixels for PNG/SVG output.
    pub qr_size: u32,
    /// Where PNG/SVG codes go when no output file is given.
    pub output_dir: Option<PathBuf>,
    /// Print secrets next to each row of an imported list.
    pub show_secrets_in_list: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            qr_format: QrFormat::Terminal,
            qr_size: DEFAULT_QR_SIZE,
            output_dir: None,
            show_secrets_in_list: false,
        }
    }
}

impl AppConfig {
    /// `<config dir>/otpbridge/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("otpbridge").join("config.json"))
    }

    /// Load from an explicit path, or from the default location if a file
    /// exists there, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, AppError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&raw).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Apply `OTPBRIDGE_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(format) = lookup(ENV_QR_FORMAT) {
            self.qr_format = format.parse()?;
        }
        if let Some(size) = lookup(ENV_QR_SIZE) {
            self.qr_size = size
                .parse()
                .map_err(|_| AppError::Usage(format!("{} must be a number, got '{}'", ENV_QR_SIZE, size)))?;
        }
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), AppError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn renderer(&self) -> QrCodeRenderer {
        self.renderer_for(self.qr_format)
    }

    pub fn renderer_for(&self, format: QrFormat) -> QrCodeRenderer {
        QrCodeRenderer::new(format).with_size(self.qr_size)
    }

    /// Directory for generated image files.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
