//! Deployment configuration, read once at startup.
//!
//! Everything has a default, so running without a config file works. Colours
//! are validated here; an invalid stop aborts startup instead of surfacing
//! later as a wrong fill.

use crate::aggregate::{DEFAULT_MERGE_THRESHOLD_PERCENT, MergeOptions};
use crate::color::{ColorScale, ColorSpec, Curve, DEFAULT_EXPONENT, Rgb};
use crate::error::ConfigError;
use crate::loader::DataFiles;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "turizem.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    Linear,
    #[default]
    Power,
    Log,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub stops: Vec<ColorSpec>,
    pub curve: CurveKind,
    pub exponent: Option<f64>,
    /// Fill for areas with zero visits.
    pub no_data: ColorSpec,
    /// Fill for areas whose data is missing altogether.
    pub error: ColorSpec,
    /// Fixed value range; derived from the data when unset.
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            stops: vec!["#41e786".into(), "#f2c14e".into(), "#d16135".into()],
            curve: CurveKind::Power,
            exponent: None,
            no_data: "#e0e0e0".into(),
            error: "#ff0000ff".into(),
            min_value: None,
            max_value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data directory or base URL.
    pub data: String,
    pub files: DataFiles,
    pub colors: ColorConfig,
    pub merge_threshold_percent: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: "data".into(),
            files: DataFiles::default(),
            colors: ColorConfig::default(),
            merge_threshold_percent: DEFAULT_MERGE_THRESHOLD_PERCENT,
        }
    }
}

/// Validated, ready-to-use settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Scale template; the application context fits its range to the data.
    pub scale: ColorScale,
    /// Range bounds pinned by the config, overriding the data-derived ones.
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub error_color: Rgb,
    pub merge: MergeOptions,
}

/// `<config dir>/turizem/turizem.json`, if the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("turizem").join(CONFIG_FILE_NAME))
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
    }

    /// Read `path` if given (it must exist), else the default location if it
    /// exists, else built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => match default_path() {
                Some(p) if p.is_file() => Self::from_file(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let c = &self.colors;
        let stops = c
            .stops
            .iter()
            .map(ColorSpec::to_rgb)
            .collect::<Result<Vec<_>, _>>()?;
        let curve = match c.curve {
            CurveKind::Linear => Curve::Linear,
            CurveKind::Power => Curve::Power(c.exponent.unwrap_or(DEFAULT_EXPONENT)),
            CurveKind::Log => Curve::Log,
        };
        let min = c.min_value.unwrap_or(0.0);
        let max = c.max_value.unwrap_or(min.max(1.0));
        let scale = ColorScale::new(min, max, stops, curve, c.no_data.to_rgb()?)?;

        let pct = self.merge_threshold_percent;
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(ConfigError::MergeThreshold(pct));
        }

        Ok(Settings {
            scale,
            min_value: c.min_value,
            max_value: c.max_value,
            error_color: c.error.to_rgb()?,
            merge: MergeOptions {
                threshold_percent: pct,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let s = Config::default().validate().unwrap();
        assert_eq!(s.scale.stops().len(), 3);
        assert_eq!(s.scale.curve(), Curve::Power(0.5));
        assert_eq!(s.error_color, Rgb::new(255, 0, 0));
        assert!(s.min_value.is_none() && s.max_value.is_none());
    }

    #[test]
    fn bad_stop_fails_fast() {
        let mut cfg = Config::default();
        cfg.colors.stops[1] = "#12345".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::Color(_))));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: Config = serde_json::from_str(
            r##"{"colors": {"curve": "log", "stops": ["#000000", [255, 255, 255]]}}"##,
        )
        .unwrap();
        assert_eq!(cfg.merge_threshold_percent, 2.0);
        let s = cfg.validate().unwrap();
        assert_eq!(s.scale.curve(), Curve::Log);
        assert_eq!(s.scale.stops()[1], Rgb::new(255, 255, 255));
    }
}
