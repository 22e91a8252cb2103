//! # earshot-detector
//!
//! Inference engine for the earshot huddle detector: composite scoring of
//! noisy audio indicators, baseline calibration, rolling-trend smoothing,
//! and a debounced hysteresis state machine.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. One cooperative loop.
//! - **Fail open**: An indicator that cannot be observed is a zero, never
//!   an error; a degraded probe lowers the score instead of crashing.
//! - **Pure transitions**: The state machine is a function from (state,
//!   inputs) to (state, transition). Replaying a tick cannot double-count.
//! - **Single owner**: Every mutable piece lives in `Monitor`; the only
//!   cross-thread state is one atomic control flag.
//!
//! Probing (lsof, pmset, ioreg, process scans) lives in the daemon crate
//! behind the `IndicatorProbe` trait; this crate never spawns a process.

// Public modules
pub mod baseline;
pub mod config;
pub mod control;
pub mod detector;
pub mod error;
pub mod history;
pub mod monitor;
pub mod probe;
pub mod publisher;
pub mod scorer;

// Re-export commonly used items at crate root
pub use baseline::{calibrate, Baseline, MIN_CALIBRATION_SAMPLES};
pub use config::{
    default_status_path, load_runtime_config, RuntimeConfig, SamplingConfig, StatusFileConfig,
    ThresholdsConfig,
};
pub use control::{ControlHandle, ManualOverride};
pub use detector::{advance, DetectorState, Phase, StepOutcome, TickInputs, Transition};
pub use error::{DetectorError, Result};
pub use history::{ScoreHistory, HISTORY_CAPACITY};
pub use monitor::Monitor;
pub use probe::{IndicatorProbe, IndicatorSnapshot};
pub use publisher::StatusPublisher;
pub use scorer::{score, ScoreResult};
