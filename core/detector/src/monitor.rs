//! The monitoring loop.
//!
//! `Monitor` owns every mutable piece (probe, history, baseline, state) and
//! is their single writer. One call to `tick` is one full cycle: sample,
//! score, record, evaluate, publish. Nothing in a cycle can abort the loop;
//! probing degrades to zeros and publishing failures are logged and
//! swallowed.

use std::thread;

use tracing::{debug, info, warn};

use crate::baseline::{self, Baseline};
use crate::config::RuntimeConfig;
use crate::control::ControlHandle;
use crate::detector::{advance, DetectorState, TickInputs, Transition};
use crate::error::Result;
use crate::history::ScoreHistory;
use crate::probe::IndicatorProbe;
use crate::publisher::StatusPublisher;
use crate::scorer;

pub struct Monitor<P: IndicatorProbe> {
    probe: P,
    config: RuntimeConfig,
    publisher: StatusPublisher,
    control: ControlHandle,
    history: ScoreHistory,
    baseline: Baseline,
    state: DetectorState,
}

impl<P: IndicatorProbe> Monitor<P> {
    /// Calibrates the baseline and returns a monitor ready to tick. Fails
    /// when calibration cannot gather enough samples; ticking against an
    /// unset baseline would detect everything or nothing.
    pub fn calibrate(
        mut probe: P,
        config: RuntimeConfig,
        publisher: StatusPublisher,
        control: ControlHandle,
    ) -> Result<Self> {
        let baseline = baseline::calibrate(
            config.sampling.calibration_samples,
            config.sampling.interval(),
            &mut probe,
        )?;

        if baseline.value() >= config.thresholds.start_floor {
            warn!(
                baseline = baseline.value(),
                start_floor = config.thresholds.start_floor,
                "Calibrated baseline is at or above the start floor; was a huddle running during calibration?"
            );
        }
        info!(
            baseline = baseline.value(),
            samples = config.sampling.calibration_samples,
            "Baseline calibrated"
        );

        Ok(Self {
            probe,
            config,
            publisher,
            control,
            history: ScoreHistory::new(),
            baseline,
            state: DetectorState::new(),
        })
    }

    /// One cycle. Returns the confirmed transition, if this tick produced
    /// one.
    pub fn tick(&mut self) -> Option<Transition> {
        let indicators = self.probe.sample();
        let scored = scorer::score(&indicators);
        self.history.push(scored.score);
        let trend = self.history.trend();

        let inputs = TickInputs {
            score: scored.score,
            trend,
            baseline: self.baseline.value(),
            override_cmd: self.control.take_override(),
        };
        let outcome = advance(&self.state, &self.config.thresholds, &inputs);
        self.state = outcome.state;

        match outcome.transition {
            Some(Transition::HuddleStarted { score }) => {
                info!(
                    score,
                    baseline = self.baseline.value(),
                    reasons = ?scored.reasons,
                    "Huddle started"
                );
            }
            Some(Transition::HuddleEnded { score, peak }) => {
                self.baseline.reanchor(score);
                info!(
                    score,
                    peak,
                    new_baseline = self.baseline.value(),
                    "Huddle ended"
                );
            }
            None => {
                debug!(
                    phase = self.state.phase.as_str(),
                    score = scored.score,
                    trend,
                    baseline = self.baseline.value(),
                    peak = self.state.peak_score,
                    "Tick"
                );
            }
        }

        if let Err(err) = self.publisher.publish(
            &self.state,
            self.baseline.value(),
            scored.score,
            trend,
            &indicators,
        ) {
            warn!(
                error = %err,
                path = %self.publisher.path().display(),
                "Failed to publish status snapshot"
            );
        }

        outcome.transition
    }

    /// Ticks at the configured interval until shutdown is requested.
    pub fn run(&mut self) {
        let interval = self.config.sampling.interval();
        loop {
            self.tick();
            if self.control.shutdown_requested() {
                info!("Shutdown requested; monitor loop stopping");
                break;
            }
            thread::sleep(interval);
        }
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn history(&self) -> &ScoreHistory {
        &self.history
    }
}
