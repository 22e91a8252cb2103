//! The huddle state machine.
//!
//! `advance` is a pure function from (state, inputs) to (next state,
//! transition). All mutation belongs to the caller holding the
//! `DetectorState`, and replaying a tick against the same state yields the
//! same outcome, so a crashed-and-restarted loop cannot double-count
//! debounce progress.
//!
//! The thresholds are asymmetric on purpose: starts must clear a floor
//! above the calibrated baseline with a non-falling trend, while ends fire
//! on any of a peak-relative drop, a return to near-baseline, or a sharp
//! decline. Both directions are debounced by `confirm_ticks`.

use crate::config::ThresholdsConfig;
use crate::control::ManualOverride;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active,
}

impl Phase {
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Active => "active",
        }
    }
}

/// Everything the state machine carries between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorState {
    pub phase: Phase,
    /// Highest score seen during the session in progress; zero while idle.
    pub peak_score: u32,
    pub consecutive_starts: u32,
    pub consecutive_ends: u32,
}

impl DetectorState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            peak_score: 0,
            consecutive_starts: 0,
            consecutive_ends: 0,
        }
    }
}

impl Default for DetectorState {
    fn default() -> Self {
        Self::new()
    }
}

/// One tick's worth of evidence, with probe failures already resolved to
/// zeros upstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInputs {
    pub score: u32,
    pub trend: f64,
    pub baseline: f64,
    pub override_cmd: Option<ManualOverride>,
}

/// A confirmed phase change. At most one per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    HuddleStarted { score: u32 },
    /// The caller re-anchors the baseline to `score` on this transition.
    HuddleEnded { score: u32, peak: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub state: DetectorState,
    pub transition: Option<Transition>,
}

pub fn advance(
    state: &DetectorState,
    thresholds: &ThresholdsConfig,
    inputs: &TickInputs,
) -> StepOutcome {
    if let Some(forced) = inputs.override_cmd {
        if let Some(outcome) = apply_override(state, forced, inputs) {
            return outcome;
        }
    }

    match state.phase {
        Phase::Idle => advance_idle(state, thresholds, inputs),
        Phase::Active => advance_active(state, thresholds, inputs),
    }
}

/// An override matching the current phase is a no-op and falls through to
/// the normal evaluation; an opposing one transitions immediately, skipping
/// the debounce.
fn apply_override(
    state: &DetectorState,
    forced: ManualOverride,
    inputs: &TickInputs,
) -> Option<StepOutcome> {
    match (forced, state.phase) {
        (ManualOverride::ForceStart, Phase::Idle) => Some(StepOutcome {
            state: DetectorState {
                phase: Phase::Active,
                peak_score: inputs.score,
                consecutive_starts: 0,
                consecutive_ends: 0,
            },
            transition: Some(Transition::HuddleStarted {
                score: inputs.score,
            }),
        }),
        (ManualOverride::ForceEnd, Phase::Active) => Some(StepOutcome {
            state: DetectorState {
                phase: Phase::Idle,
                peak_score: 0,
                consecutive_starts: 0,
                consecutive_ends: 0,
            },
            transition: Some(Transition::HuddleEnded {
                score: inputs.score,
                peak: state.peak_score,
            }),
        }),
        _ => None,
    }
}

fn advance_idle(
    state: &DetectorState,
    thresholds: &ThresholdsConfig,
    inputs: &TickInputs,
) -> StepOutcome {
    let start_threshold = thresholds
        .start_floor
        .max(inputs.baseline + thresholds.start_margin);
    let should_start = f64::from(inputs.score) >= start_threshold && inputs.trend >= 0.0;

    if !should_start {
        return StepOutcome {
            state: DetectorState {
                consecutive_starts: 0,
                consecutive_ends: 0,
                ..*state
            },
            transition: None,
        };
    }

    let starts = state.consecutive_starts.saturating_add(1);
    if starts >= thresholds.confirm_ticks {
        StepOutcome {
            state: DetectorState {
                phase: Phase::Active,
                peak_score: inputs.score,
                consecutive_starts: 0,
                consecutive_ends: 0,
            },
            transition: Some(Transition::HuddleStarted {
                score: inputs.score,
            }),
        }
    } else {
        StepOutcome {
            state: DetectorState {
                consecutive_starts: starts,
                consecutive_ends: 0,
                ..*state
            },
            transition: None,
        }
    }
}

fn advance_active(
    state: &DetectorState,
    thresholds: &ThresholdsConfig,
    inputs: &TickInputs,
) -> StepOutcome {
    // End conditions compare against the peak as of the previous tick; the
    // peak is raised only after the tick survives them.
    let score = f64::from(inputs.score);
    let end_by_ratio = score < thresholds.end_peak_ratio * f64::from(state.peak_score);
    let end_by_baseline = score <= inputs.baseline + thresholds.end_baseline_margin;
    let end_by_trend =
        inputs.trend < thresholds.end_trend_drop && score < thresholds.end_score_ceiling;

    if end_by_ratio || end_by_baseline || end_by_trend {
        let ends = state.consecutive_ends.saturating_add(1);
        if ends >= thresholds.confirm_ticks {
            return StepOutcome {
                state: DetectorState {
                    phase: Phase::Idle,
                    peak_score: 0,
                    consecutive_starts: 0,
                    consecutive_ends: 0,
                },
                transition: Some(Transition::HuddleEnded {
                    score: inputs.score,
                    peak: state.peak_score,
                }),
            };
        }
        return StepOutcome {
            state: DetectorState {
                peak_score: state.peak_score.max(inputs.score),
                consecutive_starts: 0,
                consecutive_ends: ends,
                ..*state
            },
            transition: None,
        };
    }

    StepOutcome {
        state: DetectorState {
            peak_score: state.peak_score.max(inputs.score),
            consecutive_starts: 0,
            consecutive_ends: 0,
            ..*state
        },
        transition: None,
    }
}
