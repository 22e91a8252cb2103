//! Operator control listener.
//!
//! Reads line commands from stdin on its own thread and talks to the loop
//! only through the shared control handle. Spawned only when stdin is a
//! terminal; under launchd there is no operator and the thread would just
//! pin a closed pipe.

use std::io::{self, BufRead, IsTerminal};
use std::thread;

use tracing::{info, warn};

use earshot_detector::{ControlHandle, ManualOverride};

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Start,
    End,
    Quit,
}

pub fn spawn_if_interactive(control: ControlHandle) {
    if !io::stdin().is_terminal() {
        return;
    }
    thread::spawn(move || listen(control));
}

fn listen(control: ControlHandle) {
    info!("Operator commands: start | end | quit");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        match parse_command(&line) {
            Some(Command::Start) => {
                control.request_override(ManualOverride::ForceStart);
                info!("Manual override: force start");
            }
            Some(Command::End) => {
                control.request_override(ManualOverride::ForceEnd);
                info!("Manual override: force end");
            }
            Some(Command::Quit) => {
                control.request_shutdown();
                info!("Shutdown requested by operator");
                break;
            }
            None if line.trim().is_empty() => {}
            None => {
                warn!(input = %line.trim(), "Unknown command (expected start | end | quit)");
            }
        }
    }
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "start" | "s" | "h" => Some(Command::Start),
        "end" | "e" | "n" => Some(Command::End),
        "quit" | "q" => Some(Command::Quit),
        _ => None,
    }
}
