//! Indicator snapshots and the probing boundary.
//!
//! The engine consumes one `IndicatorSnapshot` per tick and never learns
//! how it was produced. Production probing (lsof, pmset, ioreg, process
//! scans) lives in the daemon crate behind `IndicatorProbe`; tests feed
//! scripted snapshots through the same trait.

/// One sample of every indicator the scorer understands.
///
/// All values are raw counts. A probe that cannot observe an indicator
/// reports zero for it; scoring treats "unavailable" and "zero" as the same
/// thing, so a broken probe pulls the score down instead of raising errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndicatorSnapshot {
    /// Audio-tagged power assertions held anywhere on the system.
    pub power_assertions: u32,
    /// Power assertions held by Slack itself.
    pub slack_assertions: u32,
    /// AudioToolbox descriptors open in Slack processes.
    pub audio_units: u32,
    /// HAL plugin descriptors open in Slack processes.
    pub hal_plugins: u32,
    /// Any audio-related descriptors open in Slack processes.
    pub audio_fds: u32,
    /// Active audio engine entries in the IORegistry.
    pub io_registry_clients: u32,
    /// coreaudiod connections open in Slack processes.
    pub core_audio_taps: u32,
    /// UDP sockets talking to STUN/TURN ports.
    pub stun_sockets: u32,
    /// Slack processes currently above the busy-CPU floor.
    pub busy_helpers: u32,
}

/// Source of one indicator snapshot per tick.
///
/// Implementations must be infallible: probing failures resolve to zeros
/// inside the snapshot, never to an error the loop would have to handle.
pub trait IndicatorProbe {
    fn sample(&mut self) -> IndicatorSnapshot;
}
