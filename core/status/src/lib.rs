//! Status file schema for the earshot huddle detector.
//!
//! This crate is shared by the daemon and anything that reads the status
//! file (menubar widgets, scripts) to prevent schema drift. The daemon is
//! the only writer and replaces the file wholesale on every tick; readers
//! must treat a missing or unreadable file as "no status yet", never as an
//! error.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Trend deltas beyond this magnitude render as a directional arrow.
pub const TREND_ARROW_CUTOFF: f64 = 5.0;

/// Coarse direction of the recent score trend, serialized as the literal
/// arrow glyph so shell readers can splice it into a status line untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendArrow {
    #[serde(rename = "↑")]
    Rising,
    #[serde(rename = "↓")]
    Falling,
    #[serde(rename = "→")]
    Flat,
}

impl TrendArrow {
    pub fn from_delta(delta: f64) -> Self {
        if delta > TREND_ARROW_CUTOFF {
            TrendArrow::Rising
        } else if delta < -TREND_ARROW_CUTOFF {
            TrendArrow::Falling
        } else {
            TrendArrow::Flat
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendArrow::Rising => "↑",
            TrendArrow::Falling => "↓",
            TrendArrow::Flat => "→",
        }
    }
}

/// Raw indicator counts surfaced alongside the score for debugging a
/// detection from the reader side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMetrics {
    pub slack_assertions: u32,
    pub audio_units: u32,
    pub audio_fds: u32,
    pub power_assertions: u32,
}

/// One complete published snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub in_huddle: bool,
    pub score: u32,
    pub baseline: f64,
    /// Highest score of the session in progress; zero while idle.
    pub peak_score: u32,
    pub trend: TrendArrow,
    /// Local wall clock of the producing tick, `HH:MM:SS`.
    pub timestamp: String,
    pub metrics: StatusMetrics,
}

/// Reads the latest snapshot, returning `None` when the file is missing,
/// unreadable, or does not parse (e.g. a torn write on a filesystem without
/// atomic rename).
pub fn load_status(path: &Path) -> Option<StatusSnapshot> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}
