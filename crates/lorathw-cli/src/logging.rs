use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize stderr logging with an optional level from the command line.
pub fn init_logging(log_level: Option<&str>, quiet: bool) {
    FmtSubscriber::builder()
        .with_target(false)
        .with_max_level(effective_level(log_level, quiet))
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

/// Falls back to INFO if level is None or invalid; `quiet` caps it at WARN.
fn effective_level(log_level: Option<&str>, quiet: bool) -> Level {
    let level = log_level
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    if quiet { level.min(Level::WARN) } else { level }
}
