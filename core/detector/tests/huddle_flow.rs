//! End-to-end flow through the monitor: calibration, a debounced start,
//! peak tracking, a debounced end with baseline re-anchoring, and the
//! snapshot the whole way through, all driven by scripted indicator
//! snapshots.

use std::collections::VecDeque;
use std::path::PathBuf;

use earshot_detector::{
    ControlHandle, IndicatorProbe, IndicatorSnapshot, ManualOverride, Monitor, Phase,
    RuntimeConfig, SamplingConfig, StatusPublisher, Transition, HISTORY_CAPACITY,
};
use earshot_status::{load_status, TrendArrow};

struct ScriptedProbe {
    snapshots: VecDeque<IndicatorSnapshot>,
}

impl ScriptedProbe {
    fn new(snapshots: Vec<IndicatorSnapshot>) -> Self {
        Self {
            snapshots: snapshots.into(),
        }
    }
}

impl IndicatorProbe for ScriptedProbe {
    fn sample(&mut self) -> IndicatorSnapshot {
        self.snapshots.pop_front().unwrap_or_default()
    }
}

/// Scores 0.
fn quiet() -> IndicatorSnapshot {
    IndicatorSnapshot::default()
}

/// Scores 25 + 60 = 85.
fn in_call() -> IndicatorSnapshot {
    IndicatorSnapshot {
        power_assertions: 1,
        slack_assertions: 3,
        ..Default::default()
    }
}

/// Scores 85 + 30 = 115.
fn loud_call() -> IndicatorSnapshot {
    IndicatorSnapshot {
        power_assertions: 1,
        slack_assertions: 3,
        audio_units: 2,
        ..Default::default()
    }
}

/// Scores 15: above zero, below every start threshold.
fn winding_down() -> IndicatorSnapshot {
    IndicatorSnapshot {
        audio_units: 1,
        ..Default::default()
    }
}

fn test_config() -> RuntimeConfig {
    RuntimeConfig {
        sampling: SamplingConfig {
            // Zero interval keeps calibration sleeps out of the test.
            interval_secs: 0,
            calibration_samples: 3,
        },
        ..Default::default()
    }
}

fn monitor_with(
    script: Vec<IndicatorSnapshot>,
    status_path: PathBuf,
    control: ControlHandle,
) -> Monitor<ScriptedProbe> {
    let probe = ScriptedProbe::new(script);
    let publisher = StatusPublisher::new(status_path);
    Monitor::calibrate(probe, test_config(), publisher, control).expect("calibration succeeds")
}

#[test]
fn full_session_lifecycle_with_debounce_and_reanchor() {
    let dir = tempfile::tempdir().expect("temp dir");
    let status_path = dir.path().join("status.json");

    // Three calibration samples, then the monitoring script.
    let script = vec![
        quiet(),
        quiet(),
        quiet(),
        // Two idle ticks.
        quiet(),
        quiet(),
        // A huddle ramps up: confirmed on the second qualifying tick.
        in_call(),
        in_call(),
        // Louder mid-call tick raises the peak.
        loud_call(),
        // Wind-down: confirmed on the second qualifying tick.
        winding_down(),
        winding_down(),
    ];
    let mut monitor = monitor_with(script, status_path.clone(), ControlHandle::new());

    assert_eq!(monitor.baseline().value(), 0.0);

    // Idle ticks change nothing.
    assert_eq!(monitor.tick(), None);
    assert_eq!(monitor.tick(), None);
    assert_eq!(monitor.state().phase, Phase::Idle);

    // First qualifying tick arms the debounce, second confirms.
    assert_eq!(monitor.tick(), None);
    assert_eq!(
        monitor.tick(),
        Some(Transition::HuddleStarted { score: 85 })
    );
    assert_eq!(monitor.state().phase, Phase::Active);
    assert_eq!(monitor.state().peak_score, 85);

    let mid_start = load_status(&status_path).expect("status readable");
    assert!(mid_start.in_huddle);
    assert_eq!(mid_start.score, 85);
    assert_eq!(mid_start.peak_score, 85);
    assert_eq!(mid_start.metrics.slack_assertions, 3);

    // Louder tick survives the end checks and raises the peak.
    assert_eq!(monitor.tick(), None);
    assert_eq!(monitor.state().peak_score, 115);

    // Wind-down: 15 < 0.7 * 115, armed then confirmed.
    assert_eq!(monitor.tick(), None);
    assert_eq!(monitor.state().phase, Phase::Active);
    assert_eq!(
        monitor.tick(),
        Some(Transition::HuddleEnded {
            score: 15,
            peak: 115
        })
    );
    assert_eq!(monitor.state().phase, Phase::Idle);
    assert_eq!(monitor.state().peak_score, 0);

    // The baseline re-anchored to the confirming score.
    assert_eq!(monitor.baseline().value(), 15.0);

    let after_end = load_status(&status_path).expect("status readable");
    assert!(!after_end.in_huddle);
    assert_eq!(after_end.score, 15);
    assert_eq!(after_end.peak_score, 0);
    assert!((after_end.baseline - 15.0).abs() < f64::EPSILON);
    assert_eq!(after_end.trend, TrendArrow::Falling);
}

#[test]
fn reanchored_baseline_raises_the_next_start_threshold() {
    let dir = tempfile::tempdir().expect("temp dir");
    let status_path = dir.path().join("status.json");

    // Calibrate quiet, start at 85, end at a noisy 40: the new baseline of
    // 40 pushes the next start threshold to 65, so 60-point ticks no
    // longer qualify.
    let noisy_end = IndicatorSnapshot {
        slack_assertions: 2,
        ..Default::default()
    };
    assert_eq!(earshot_detector::score(&noisy_end).score, 40);
    let sixty = IndicatorSnapshot {
        power_assertions: 1,
        audio_units: 1,
        slack_assertions: 1,
        ..Default::default()
    };
    assert_eq!(earshot_detector::score(&sixty).score, 60);

    let script = vec![
        quiet(),
        quiet(),
        quiet(),
        in_call(),
        in_call(),
        noisy_end,
        noisy_end,
        sixty,
        sixty,
        sixty,
    ];
    let mut monitor = monitor_with(script, status_path, ControlHandle::new());

    assert_eq!(monitor.tick(), None);
    assert!(matches!(
        monitor.tick(),
        Some(Transition::HuddleStarted { .. })
    ));
    // 40 <= 0 + 10 fails, but 40 < 0.7 * 85 ends the session.
    assert_eq!(monitor.tick(), None);
    assert!(matches!(
        monitor.tick(),
        Some(Transition::HuddleEnded { score: 40, .. })
    ));
    assert_eq!(monitor.baseline().value(), 40.0);

    // 60 < max(50, 40 + 25): never arms.
    assert_eq!(monitor.tick(), None);
    assert_eq!(monitor.tick(), None);
    assert_eq!(monitor.tick(), None);
    assert_eq!(monitor.state().phase, Phase::Idle);
    assert_eq!(monitor.state().consecutive_starts, 0);
}

#[test]
fn manual_override_starts_and_ends_without_debounce() {
    let dir = tempfile::tempdir().expect("temp dir");
    let status_path = dir.path().join("status.json");
    let control = ControlHandle::new();

    let script = vec![quiet(), quiet(), quiet(), quiet(), winding_down(), quiet()];
    let mut monitor = monitor_with(script, status_path.clone(), control.clone());

    // A quiet tick with a forced start transitions immediately.
    control.request_override(ManualOverride::ForceStart);
    assert_eq!(monitor.tick(), Some(Transition::HuddleStarted { score: 0 }));
    assert_eq!(monitor.state().phase, Phase::Active);

    // Forced end on a 15-point tick re-anchors the baseline to 15.
    control.request_override(ManualOverride::ForceEnd);
    assert_eq!(
        monitor.tick(),
        Some(Transition::HuddleEnded { score: 15, peak: 0 })
    );
    assert_eq!(monitor.baseline().value(), 15.0);

    let snapshot = load_status(&status_path).expect("status readable");
    assert!(!snapshot.in_huddle);

    // The override slot is empty again; the next tick is ordinary.
    assert_eq!(monitor.tick(), None);
}

#[test]
fn history_stays_bounded_over_a_long_idle_stretch() {
    let dir = tempfile::tempdir().expect("temp dir");
    let status_path = dir.path().join("status.json");

    let script = vec![quiet(); 3 + HISTORY_CAPACITY + 5];
    let mut monitor = monitor_with(script, status_path, ControlHandle::new());

    for _ in 0..(HISTORY_CAPACITY + 5) {
        monitor.tick();
    }
    assert_eq!(monitor.history().len(), HISTORY_CAPACITY);
}

#[test]
fn publish_failures_do_not_stop_the_loop() {
    let dir = tempfile::tempdir().expect("temp dir");
    let status_path = dir.path().join("missing-dir").join("status.json");

    let script = vec![quiet(), quiet(), quiet(), in_call(), in_call()];
    let mut monitor = monitor_with(script, status_path, ControlHandle::new());

    // Every publish fails; detection still confirms on the second tick.
    assert_eq!(monitor.tick(), None);
    assert!(matches!(
        monitor.tick(),
        Some(Transition::HuddleStarted { .. })
    ));
}
