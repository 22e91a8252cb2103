//! Composite scoring of one indicator snapshot.
//!
//! Pure: the same snapshot always produces the same score and the same
//! reasons in the same order, so a transition can be reconstructed from a
//! logged snapshot alone. Weights are fixed; runtime tuning happens at the
//! threshold layer, not here.

use crate::probe::IndicatorSnapshot;

const POWER_ASSERTION_BONUS: u32 = 25;
const SLACK_ASSERTION_WEIGHT: u32 = 20;
const SLACK_ASSERTION_CAP: u32 = 3;
const AUDIO_UNIT_WEIGHT: u32 = 15;
const AUDIO_UNIT_CAP: u32 = 2;
const HAL_PLUGIN_BONUS: u32 = 10;
const STUN_SOCKET_WEIGHT: u32 = 20;
const STUN_SOCKET_CAP: u32 = 2;
/// Slack keeps a handful of audio descriptors open even while idle; only
/// counts above this floor mean anything.
const AUDIO_FD_FLOOR: u32 = 3;
const AUDIO_FD_BONUS: u32 = 5;
const IO_REGISTRY_BONUS: u32 = 10;
const CORE_AUDIO_BONUS: u32 = 10;
/// One busy helper is normal churn; a call keeps several hot at once.
const BUSY_HELPER_FLOOR: u32 = 1;
const BUSY_HELPER_BONUS: u32 = 5;

/// A composite score together with the rules that contributed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreResult {
    pub score: u32,
    pub reasons: Vec<String>,
}

pub fn score(snapshot: &IndicatorSnapshot) -> ScoreResult {
    let mut score = 0u32;
    let mut reasons = Vec::new();

    // Strong indicators.
    if snapshot.power_assertions > 0 {
        score += POWER_ASSERTION_BONUS;
        reasons.push(format!("Audio power: {}", snapshot.power_assertions));
    }
    if snapshot.slack_assertions > 0 {
        score += SLACK_ASSERTION_WEIGHT * snapshot.slack_assertions.min(SLACK_ASSERTION_CAP);
        reasons.push(format!("Slack assertions: {}", snapshot.slack_assertions));
    }

    // Medium indicators.
    if snapshot.audio_units > 0 {
        score += AUDIO_UNIT_WEIGHT * snapshot.audio_units.min(AUDIO_UNIT_CAP);
        reasons.push(format!("Audio units: {}", snapshot.audio_units));
    }
    if snapshot.hal_plugins > 0 {
        score += HAL_PLUGIN_BONUS;
        reasons.push(format!("HAL plugins: {}", snapshot.hal_plugins));
    }
    if snapshot.stun_sockets > 0 {
        score += STUN_SOCKET_WEIGHT * snapshot.stun_sockets.min(STUN_SOCKET_CAP);
        reasons.push(format!("STUN sockets: {}", snapshot.stun_sockets));
    }

    // Weak indicators.
    if snapshot.audio_fds > AUDIO_FD_FLOOR {
        score += AUDIO_FD_BONUS;
        reasons.push(format!("Audio FDs: {}", snapshot.audio_fds));
    }
    if snapshot.io_registry_clients > 0 {
        score += IO_REGISTRY_BONUS;
        reasons.push(format!("IO clients: {}", snapshot.io_registry_clients));
    }
    if snapshot.core_audio_taps > 0 {
        score += CORE_AUDIO_BONUS;
        reasons.push(format!("CoreAudio: {}", snapshot.core_audio_taps));
    }
    if snapshot.busy_helpers > BUSY_HELPER_FLOOR {
        score += BUSY_HELPER_BONUS;
        reasons.push(format!("Busy helpers: {}", snapshot.busy_helpers));
    }

    ScoreResult { score, reasons }
}
