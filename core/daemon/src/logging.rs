//! Logging initialization.
//!
//! Console plus a daily rolling file under `~/.earshot/logs/`. The returned
//! guard must stay alive for the life of the process or buffered file
//! output is lost on exit.

use std::env;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "earshot-daemon.log";

fn env_filter() -> EnvFilter {
    let debug_enabled = env::var("EARSHOT_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn log_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".earshot").join("logs"))
}

pub fn init() -> Option<WorkerGuard> {
    if let Some(dir) = log_dir() {
        if fs_err::create_dir_all(&dir).is_ok() {
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(env_filter())
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            return Some(guard);
        }
    }

    // Unwritable home: stderr-only logging keeps the daemon usable.
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();
    None
}
