use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::overlay::domain::overlay_renderer::BoundsStyle;
use crate::shared::constants::{CENTER_REGION_MARGIN, MIN_FACE_SIZE};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tuning for the cascade detector backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// Proportion of the image's shorter side.
    pub min_face_size: f32,
    pub score_threshold: f64,
    pub pyramid_scale_factor: f32,
    pub slide_window_step: u32,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            min_face_size: MIN_FACE_SIZE,
            score_threshold: 2.0,
            pyramid_scale_factor: 0.8,
            slide_window_step: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub center_region_margin: f32,
    pub detector: DetectorSettings,
    pub bounds: BoundsStyle,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            center_region_margin: CENTER_REGION_MARGIN,
            detector: DetectorSettings::default(),
            bounds: BoundsStyle::default(),
        }
    }
}

impl OverlayConfig {
    /// `<config dir>/FaceOverlay/settings.json`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceOverlay").join("settings.json"))
    }

    /// Loads from `path`, or from [`Self::default_path`] when none is given.
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(p) => Self::read(p)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => Self::read(&p)?,
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..0.5).contains(&self.center_region_margin) {
            return Err(ConfigError::Invalid(format!(
                "center_region_margin must be in [0.0, 0.5), got {}",
                self.center_region_margin
            )));
        }
        let d = &self.detector;
        if !(d.min_face_size > 0.0 && d.min_face_size <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "detector.min_face_size must be in (0.0, 1.0], got {}",
                d.min_face_size
            )));
        }
        if !(d.pyramid_scale_factor > 0.0 && d.pyramid_scale_factor < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "detector.pyramid_scale_factor must be in (0.0, 1.0), got {}",
                d.pyramid_scale_factor
            )));
        }
        if d.slide_window_step == 0 {
            return Err(ConfigError::Invalid(
                "detector.slide_window_step must be >= 1".into(),
            ));
        }
        if self.bounds.stroke_width <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "bounds.stroke_width must be positive, got {}",
                self.bounds.stroke_width
            )));
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
