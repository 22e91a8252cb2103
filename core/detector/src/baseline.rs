//! Baseline calibration and re-anchoring.
//!
//! The baseline is the score the machine produces when no huddle is
//! running. It is measured once at startup and re-anchored at every
//! confirmed session end, so ambient drift (a new audio device, a second
//! Slack workspace) is absorbed between sessions instead of eroding the
//! start threshold.

use std::thread;
use std::time::Duration;

use tracing::info;

use crate::error::{DetectorError, Result};
use crate::probe::IndicatorProbe;
use crate::scorer;

/// Fewer samples than this cannot average out tick-to-tick noise.
pub const MIN_CALIBRATION_SAMPLES: u32 = 3;

/// The expected idle score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    value: f64,
}

impl Baseline {
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Re-anchors to the score observed at a confirmed session end. By the
    /// time an end confirms, the debounce has already filtered transient
    /// noise, so a point sample is an acceptable anchor.
    pub fn reanchor(&mut self, score: u32) {
        self.value = f64::from(score);
    }
}

/// Establishes the starting baseline: `samples` snapshots taken `interval`
/// apart, scored, and averaged. The monitored app must be idle while this
/// runs; there is no way to tell an inflated baseline from a genuinely
/// noisy machine, so the caller should warn when the result looks high.
pub fn calibrate<P>(samples: u32, interval: Duration, probe: &mut P) -> Result<Baseline>
where
    P: IndicatorProbe + ?Sized,
{
    if samples < MIN_CALIBRATION_SAMPLES {
        return Err(DetectorError::CalibrationTooShort {
            required: MIN_CALIBRATION_SAMPLES,
            requested: samples,
        });
    }

    let mut total = 0u64;
    for drawn in 1..=samples {
        let result = scorer::score(&probe.sample());
        total += u64::from(result.score);
        info!(sample = drawn, of = samples, score = result.score, "Calibration sample");
        if drawn < samples {
            thread::sleep(interval);
        }
    }

    Ok(Baseline {
        value: total as f64 / f64::from(samples),
    })
}
