//! earshot daemon entrypoint.
//!
//! Wires the macOS probes, the operator control listener, and the status
//! publisher into the detector's monitor loop. There are no CLI arguments;
//! all tuning lives in `~/.earshot/detector.toml` and everything in it has
//! a working default.

use tracing::{error, info, warn};

use earshot_detector::{config, ControlHandle, Monitor, StatusPublisher};

mod logging;
mod probes;
mod stdin;

use probes::CommandProbe;

fn main() {
    let _logging_guard = logging::init();

    let config = match config::load_runtime_config(None) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "Failed to load detector config; using defaults");
            config::RuntimeConfig::default()
        }
    };

    let status_path = config
        .status
        .path
        .clone()
        .unwrap_or_else(config::default_status_path);
    info!(
        status_path = %status_path.display(),
        interval_secs = config.sampling.interval_secs,
        start_floor = config.thresholds.start_floor,
        "earshot daemon starting"
    );

    let control = ControlHandle::new();
    stdin::spawn_if_interactive(control.clone());

    let probe = CommandProbe::new();
    let publisher = StatusPublisher::new(status_path);

    info!(
        samples = config.sampling.calibration_samples,
        "Calibrating baseline; keep Slack out of huddles until it finishes"
    );
    let mut monitor = match Monitor::calibrate(probe, config, publisher, control) {
        Ok(monitor) => monitor,
        Err(err) => {
            error!(error = %err, "Calibration failed; refusing to run without a baseline");
            std::process::exit(1);
        }
    };

    monitor.run();
    info!("earshot daemon stopped");
}
