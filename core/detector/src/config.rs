//! Runtime configuration for the huddle detector.
//!
//! Loaded from `~/.earshot/detector.toml`. Every field defaults to the
//! tuned constant from the deployment this replaces, so a missing file, an
//! empty file, and a file overriding a single threshold all behave
//! sensibly. A malformed file is an error; the caller decides whether to
//! abort or fall back to defaults.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DetectorError, Result};

const DEFAULT_CONFIG_RELATIVE_PATH: &str = ".earshot/detector.toml";

/// Thresholds of the detection state machine. See `detector::advance` for
/// how each one participates in the start and end conditions.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ThresholdsConfig {
    /// Absolute floor of the start threshold; the baseline margin can raise
    /// the threshold above this but never below it.
    #[serde(default = "default_start_floor")]
    pub start_floor: f64,
    /// Margin over the calibrated baseline for the start threshold.
    #[serde(default = "default_start_margin")]
    pub start_margin: f64,
    /// Consecutive confirming ticks required before any transition.
    #[serde(default = "default_confirm_ticks")]
    pub confirm_ticks: u32,
    /// A session is over when the score drops below this fraction of the
    /// session's peak.
    #[serde(default = "default_end_peak_ratio")]
    pub end_peak_ratio: f64,
    /// A session is over when the score falls back to within this margin
    /// of the baseline.
    #[serde(default = "default_end_baseline_margin")]
    pub end_baseline_margin: f64,
    /// A trend below this slope counts toward ending, but only while the
    /// score is also under `end_score_ceiling`.
    #[serde(default = "default_end_trend_drop")]
    pub end_trend_drop: f64,
    #[serde(default = "default_end_score_ceiling")]
    pub end_score_ceiling: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            start_floor: default_start_floor(),
            start_margin: default_start_margin(),
            confirm_ticks: default_confirm_ticks(),
            end_peak_ratio: default_end_peak_ratio(),
            end_baseline_margin: default_end_baseline_margin(),
            end_trend_drop: default_end_trend_drop(),
            end_score_ceiling: default_end_score_ceiling(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SamplingConfig {
    /// Seconds between ticks, and between calibration samples.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Idle samples averaged into the starting baseline.
    #[serde(default = "default_calibration_samples")]
    pub calibration_samples: u32,
}

impl SamplingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            calibration_samples: default_calibration_samples(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct StatusFileConfig {
    /// Destination of the published snapshot. When unset the daemon derives
    /// `/tmp/huddle-status-<user>.json` from the environment.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub status: StatusFileConfig,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_RELATIVE_PATH))
}

/// Loads the runtime config from `path`, or from the default location when
/// `path` is `None`. A missing file (or an unresolvable home directory)
/// yields the defaults; only a present-but-malformed file errors.
pub fn load_runtime_config(path: Option<PathBuf>) -> Result<RuntimeConfig> {
    let config_path = match path.or_else(default_config_path) {
        Some(config_path) => config_path,
        None => return Ok(RuntimeConfig::default()),
    };

    if !config_path.exists() {
        return Ok(RuntimeConfig::default());
    }

    let content = fs_err::read_to_string(&config_path).map_err(|err| DetectorError::Io {
        context: format!("reading config {}", config_path.display()),
        source: err,
    })?;
    toml::from_str::<RuntimeConfig>(&content).map_err(|err| DetectorError::ConfigMalformed {
        path: config_path,
        details: err.to_string(),
    })
}

/// Default status file path, `/tmp/huddle-status-<user>.json`.
///
/// `SUDO_USER` wins over `USER` so a daemon elevated for `lsof` visibility
/// still publishes to the path the login user's widgets watch.
pub fn default_status_path() -> PathBuf {
    let user = std::env::var("SUDO_USER")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/huddle-status-{user}.json"))
}

fn default_start_floor() -> f64 {
    50.0
}

fn default_start_margin() -> f64 {
    25.0
}

fn default_confirm_ticks() -> u32 {
    2
}

fn default_end_peak_ratio() -> f64 {
    0.7
}

fn default_end_baseline_margin() -> f64 {
    10.0
}

fn default_end_trend_drop() -> f64 {
    -10.0
}

fn default_end_score_ceiling() -> f64 {
    50.0
}

fn default_interval_secs() -> u64 {
    3
}

fn default_calibration_samples() -> u32 {
    3
}
