use env_logger::{Builder, Target};
use log::{Level, LevelFilter, SetLoggerError};
use std::env;
use std::io::Write;

/// Crates that flood the log at debug level during HTTP traffic.
const QUIET_IN_PRODUCTION: &[(&str, LevelFilter)] = &[
    ("reqwest", LevelFilter::Warn),
    ("hyper", LevelFilter::Warn),
    ("tokio", LevelFilter::Info),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LogSettings {
    level: LevelFilter,
    production: bool,
}

impl LogSettings {
    fn from_env() -> Self {
        Self::from_values(env::var("RUST_LOG").ok(), env::var("RUST_ENV").ok())
    }

    fn from_values(rust_log: Option<String>, rust_env: Option<String>) -> Self {
        Self {
            level: rust_log.as_deref().map_or(LevelFilter::Info, parse_level),
            production: rust_env.as_deref().map(str::trim) == Some("production"),
        }
    }
}

fn parse_level(value: &str) -> LevelFilter {
    match value.trim().to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// Installs the process logger on stderr so schedule output on stdout stays
/// clean. Safe to call twice; the second call reports the existing logger.
pub fn init_logging() -> Result<(), SetLoggerError> {
    let settings = LogSettings::from_env();
    let mut builder = Builder::from_default_env();

    builder.format(|buf, record| {
        let stamp = buf.timestamp();
        if record.level() == Level::Info {
            return writeln!(buf, "{} [INFO] [{}]: {}", stamp, record.target(), record.args());
        }
        writeln!(
            buf,
            "{} [{}] [{}:{}] {}: {}",
            stamp,
            record.level(),
            record.file().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.target(),
            record.args()
        )
    });

    if settings.production {
        for (module, level) in QUIET_IN_PRODUCTION {
            builder.filter_module(module, *level);
        }
    }

    builder.filter_level(settings.level).target(Target::Stderr).try_init()
}

pub fn log_error_with_context(error: &anyhow::Error, context: &str) {
    log::error!("[{}] {}", context, error);
    for cause in error.chain().skip(1) {
        log::error!("  Caused by: {}", cause);
    }
}

pub fn log_network_error(operation: &str, error: &dyn std::error::Error) {
    log::warn!("[Network] {} failed: {}", operation, error);
}

pub fn log_room_refresh(room_id: &str, events_count: usize, duration_ms: u64) {
    log::info!(
        "[Schedule] Loaded {} events for room '{}' in {}ms",
        events_count,
        room_id,
        duration_ms
    );
}

/// Attendee details stay out of the log; only the ids and outcome.
pub fn log_booking_mutation(operation: &str, room_id: &str, event_id: Option<&str>, outcome: &str) {
    log::info!(
        "[Booking] {} in room '{}' (event {}): {}",
        operation,
        room_id,
        event_id.unwrap_or("new"),
        outcome
    );
}
