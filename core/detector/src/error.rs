//! Error types for the detector engine.
//!
//! Probe failures never surface here: the indicator source resolves them to
//! zero counts before scoring, so a dead `lsof` degrades the score instead
//! of killing the daemon.

use std::path::PathBuf;

/// All errors the detector engine can produce.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// Calibration refused to run with too few samples. Fatal at startup;
    /// the daemon must not tick against an unset baseline.
    #[error("calibration needs at least {required} samples, requested {requested}")]
    CalibrationTooShort { required: u32, requested: u32 },

    #[error("configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using DetectorError.
pub type Result<T> = std::result::Result<T, DetectorError>;
