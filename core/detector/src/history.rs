//! Rolling score history and the short-term trend derived from it.

use std::collections::VecDeque;

/// Samples retained; at a 3s tick this is about 30s of recent signal.
pub const HISTORY_CAPACITY: usize = 10;

const TREND_WINDOW: usize = 3;

/// Bounded, time-ordered buffer of recent composite scores.
#[derive(Debug, Clone, Default)]
pub struct ScoreHistory {
    scores: VecDeque<u32>,
}

impl ScoreHistory {
    pub fn new() -> Self {
        Self {
            scores: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Appends one sample, evicting the oldest once capacity is reached.
    pub fn push(&mut self, score: u32) {
        if self.scores.len() == HISTORY_CAPACITY {
            self.scores.pop_front();
        }
        self.scores.push_back(score);
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Smoothed short-term direction: mean of the newest three samples
    /// minus the mean of the three before them. Exactly zero until six
    /// samples exist, so single-tick spikes cannot move the state machine
    /// during warm-up.
    pub fn trend(&self) -> f64 {
        if self.scores.len() < 2 * TREND_WINDOW {
            return 0.0;
        }
        let recent = self.window_mean(self.scores.len() - TREND_WINDOW);
        let prior = self.window_mean(self.scores.len() - 2 * TREND_WINDOW);
        recent - prior
    }

    fn window_mean(&self, start: usize) -> f64 {
        let sum: u32 = self.scores.iter().skip(start).take(TREND_WINDOW).sum();
        f64::from(sum) / TREND_WINDOW as f64
    }
}
