//! Status snapshot publishing.
//!
//! One pretty-printed JSON object per tick, replaced wholesale. Writes go
//! through a temp file in the destination directory followed by a rename,
//! so a reader polling the path never observes a half-written snapshot.
//! Publishing is best effort; the caller logs failures and keeps ticking.

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use chrono::Local;
use earshot_status::{StatusMetrics, StatusSnapshot, TrendArrow};

use crate::detector::DetectorState;
use crate::error::{DetectorError, Result};
use crate::probe::IndicatorSnapshot;

/// Readable by everyone: the daemon may run as root for probe visibility
/// while widgets read the file as the login user.
const STATUS_FILE_MODE: u32 = 0o644;

pub struct StatusPublisher {
    path: PathBuf,
}

impl StatusPublisher {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes the current tick and atomically replaces the snapshot
    /// file, stamping it with the local wall clock.
    pub fn publish(
        &self,
        state: &DetectorState,
        baseline: f64,
        score: u32,
        trend: f64,
        indicators: &IndicatorSnapshot,
    ) -> Result<()> {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        let snapshot = build_snapshot(state, baseline, score, trend, indicators, timestamp);
        self.write_snapshot(&snapshot)
    }

    fn write_snapshot(&self, snapshot: &StatusSnapshot) -> Result<()> {
        let content = serde_json::to_string_pretty(snapshot).map_err(|e| DetectorError::Json {
            context: "Failed to serialize status snapshot".to_string(),
            source: e,
        })?;

        // Write to temp file in same directory, then rename (atomic on same filesystem)
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| DetectorError::Io {
            context: "Failed to create temp file".to_string(),
            source: e,
        })?;

        tmp.write_all(content.as_bytes()).map_err(|e| DetectorError::Io {
            context: "Failed to write temp file".to_string(),
            source: e,
        })?;

        tmp.flush().map_err(|e| DetectorError::Io {
            context: "Failed to flush temp file".to_string(),
            source: e,
        })?;

        tmp.persist(&self.path).map_err(|e| DetectorError::Io {
            context: "Failed to persist status file".to_string(),
            source: e.error,
        })?;

        fs_err::set_permissions(&self.path, std::fs::Permissions::from_mode(STATUS_FILE_MODE))
            .map_err(|e| DetectorError::Io {
                context: "Failed to set status file permissions".to_string(),
                source: e,
            })?;

        Ok(())
    }
}

fn build_snapshot(
    state: &DetectorState,
    baseline: f64,
    score: u32,
    trend: f64,
    indicators: &IndicatorSnapshot,
    timestamp: String,
) -> StatusSnapshot {
    StatusSnapshot {
        in_huddle: state.phase.is_active(),
        score,
        baseline,
        peak_score: state.peak_score,
        trend: TrendArrow::from_delta(trend),
        timestamp,
        metrics: StatusMetrics {
            slack_assertions: indicators.slack_assertions,
            audio_units: indicators.audio_units,
            audio_fds: indicators.audio_fds,
            power_assertions: indicators.power_assertions,
        },
    }
}
