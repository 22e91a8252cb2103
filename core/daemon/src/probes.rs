//! macOS indicator probing.
//!
//! Each tick shells out to `lsof`, `pmset`, and `ioreg` and classifies
//! their output line by line, plus a `sysinfo` scan for busy Slack
//! processes. Every probe fails open: a missing binary, a timeout, or
//! unparseable output becomes a zero count, never an error.
//!
//! Descriptor visibility depends on privileges. Run the daemon with sudo
//! for full counts; unprivileged runs see fewer descriptors and the score
//! degrades accordingly.

use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use sysinfo::{ProcessRefreshKind, System};

use earshot_detector::{IndicatorProbe, IndicatorSnapshot};

/// Anything audio-flavored in a descriptor table, case-insensitive.
static AUDIO_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new("(?i)audio").unwrap());

/// STUN/TURN ports used by WebRTC media negotiation: classic STUN/TURN
/// plus the Google STUN range.
static STUN_PORT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":(3478|3479|1930[2-9])\b").unwrap());

/// Helpers below this CPU share are idle churn, not call encoding.
const BUSY_CPU_FLOOR: f32 = 5.0;

#[derive(Debug, Default, PartialEq, Eq)]
struct FileTableCounts {
    audio_fds: u32,
    audio_units: u32,
    hal_plugins: u32,
    core_audio_taps: u32,
}

/// Probes live system state through macOS command output.
pub struct CommandProbe {
    sys: System,
}

impl CommandProbe {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }

    /// CPU usage is a delta between refreshes, so the first tick after
    /// startup reports every process as idle. At the monitoring cadence
    /// that costs one sample, nothing more.
    fn busy_slack_processes(&mut self) -> u32 {
        self.sys
            .refresh_processes_specifics(ProcessRefreshKind::new().with_cpu());
        self.sys
            .processes()
            .values()
            .filter(|process| process.name().starts_with("Slack"))
            .filter(|process| process.cpu_usage() > BUSY_CPU_FLOOR)
            .count() as u32
    }
}

impl Default for CommandProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorProbe for CommandProbe {
    fn sample(&mut self) -> IndicatorSnapshot {
        let file_table = run_command("lsof", &["-n", "-P", "-c", "Slack"]);
        let counts = classify_file_table(&file_table);

        let udp_table = run_command("lsof", &["-i", "UDP", "-n", "-P", "-c", "Slack"]);
        let assertions = run_command("pmset", &["-g", "assertions"]);
        let (power_assertions, slack_assertions) = classify_assertions(&assertions);
        let audio_engines = run_command("ioreg", &["-r", "-c", "IOAudioEngine"]);

        IndicatorSnapshot {
            power_assertions,
            slack_assertions,
            audio_units: counts.audio_units,
            hal_plugins: counts.hal_plugins,
            audio_fds: counts.audio_fds,
            io_registry_clients: count_audio_engines(&audio_engines),
            core_audio_taps: counts.core_audio_taps,
            stun_sockets: count_stun_sockets(&udp_table),
            busy_helpers: self.busy_slack_processes(),
        }
    }
}

/// `lsof` exits non-zero for a dozen benign reasons (no matches, a stale
/// mount) while still printing the rows it found, so stdout is taken from
/// any run that started at all.
fn run_command(program: &str, args: &[&str]) -> String {
    match Command::new(program).args(args).output() {
        Ok(output) => String::from_utf8_lossy(&output.stdout).to_string(),
        Err(_) => String::new(),
    }
}

/// One pass over the Slack descriptor table, counting lines per category
/// the way the indicators are defined: a line can land in several buckets.
fn classify_file_table(output: &str) -> FileTableCounts {
    let mut counts = FileTableCounts::default();
    for line in output.lines() {
        if AUDIO_PATTERN.is_match(line) {
            counts.audio_fds += 1;
        }
        if line.contains("AudioToolbox") {
            counts.audio_units += 1;
        }
        if line.contains("HAL") {
            counts.hal_plugins += 1;
        }
        if line.contains("coreaudio") {
            counts.core_audio_taps += 1;
        }
    }
    counts
}

/// Power assertion lines: audio-tagged system-wide, plus Slack's own.
fn classify_assertions(output: &str) -> (u32, u32) {
    let mut power = 0u32;
    let mut slack = 0u32;
    for line in output.lines() {
        if AUDIO_PATTERN.is_match(line) {
            power += 1;
        }
        if line.contains("Slack") {
            slack += 1;
        }
    }
    (power, slack)
}

fn count_audio_engines(output: &str) -> u32 {
    output
        .lines()
        .filter(|line| line.contains("IOAudioEngine"))
        .count() as u32
}

fn count_stun_sockets(output: &str) -> u32 {
    output
        .lines()
        .filter(|line| STUN_PORT_PATTERN.is_match(line))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_file_table_buckets_lines_by_marker() {
        let raw = "\
COMMAND   PID USER   FD   TYPE DEVICE  SIZE/OFF NODE NAME\n\
Slack   48221 pete   21r  REG  1,13   12345    99 /System/Library/Frameworks/AudioToolbox.framework/AudioToolbox\n\
Slack   48221 pete   22u  REG  1,13   512      98 /Library/Audio/Plug-Ins/HAL/Device.driver\n\
Slack   48221 pete   23u  unix 0xa1   0t0         ->/var/run/coreaudiod.socket\n\
Slack   48221 pete   24r  REG  1,13   2048     97 /Users/pete/Library/Caches/Slack/data.db\n";

        let counts = classify_file_table(raw);
        // AudioToolbox and the HAL plug-in path both contain "audio".
        assert_eq!(counts.audio_fds, 3);
        assert_eq!(counts.audio_units, 1);
        assert_eq!(counts.hal_plugins, 1);
        assert_eq!(counts.core_audio_taps, 1);
    }

    #[test]
    fn classify_file_table_is_all_zeros_for_empty_output() {
        assert_eq!(classify_file_table(""), FileTableCounts::default());
    }

    #[test]
    fn classify_assertions_separates_audio_from_slack_lines() {
        let raw = "\
Assertion status system-wide:\n\
   PreventUserIdleDisplaySleep    1\n\
   pid 48221(Slack): [0x000f] PreventUserIdleDisplaySleep named: \"WebRTC audio session\"\n\
   pid 501(coreaudiod): [0x0a00] Audio-is-playing\n\
   pid 777(Music): [0x0b00] audio-out\n";

        let (power, slack) = classify_assertions(raw);
        assert_eq!(power, 3);
        assert_eq!(slack, 1);
    }

    #[test]
    fn count_audio_engines_counts_registry_entries() {
        let raw = "\
+-o AppleHDAEngineOutput  <class IOAudioEngine, id 0x100000301, registered>\n\
  |   \"IOAudioEngineState\" = 1\n\
+-o AppleHDAEngineInput  <class IOAudioEngine, id 0x100000302, registered>\n";

        assert_eq!(count_audio_engines(raw), 2);
    }

    #[test]
    fn stun_sockets_match_known_ports_only() {
        let raw = "\
COMMAND  PID USER   FD   TYPE DEVICE NODE NAME\n\
Slack  48221 pete   91u  IPv4 0xa    UDP  192.168.1.5:61234->74.125.250.129:19302\n\
Slack  48221 pete   92u  IPv4 0xb    UDP  192.168.1.5:61235->34.120.10.2:3478\n\
Slack  48221 pete   93u  IPv4 0xc    UDP  192.168.1.5:61236->10.0.0.1:53\n\
Slack  48221 pete   94u  IPv4 0xd    UDP  192.168.1.5:61237->10.0.0.2:34789\n";

        assert_eq!(count_stun_sockets(raw), 2);
    }

    #[test]
    fn stun_port_boundary_is_not_a_prefix_match() {
        // 34789 contains "3478" as a prefix but is not a STUN port.
        assert_eq!(count_stun_sockets("UDP 1.2.3.4:100->5.6.7.8:34789\n"), 0);
        assert_eq!(count_stun_sockets("UDP 1.2.3.4:100->5.6.7.8:3478\n"), 1);
    }

    #[test]
    fn missing_binary_fails_open_to_empty_output() {
        let output = run_command("definitely-not-a-real-binary-earshot", &[]);
        assert_eq!(output, "");
    }
}
