use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Compact-format filter when `RUST_LOG` is unset: `info` everywhere, including
/// the per-request access log from `tower_http::trace`.
pub const DEFAULT_FILTER: &str = "info,tower_http=info,axum=info";

/// JSON-format filter when `RUST_LOG` is unset. Directives match targets by module
/// prefix, so `service::storage=debug` turns on the load/save events emitted from
/// `service::storage::user_file_store` ("store loaded", "store saved") while
/// everything else stays at `info`.
pub const JSON_DEFAULT_FILTER: &str = "info,service::storage=debug";

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Falls back to [`DEFAULT_FILTER`]
/// - Writes to stdout to improve visibility in environments that hide stderr
pub fn init_logging_default() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output.
/// - Respects `RUST_LOG` if set, falls back to [`JSON_DEFAULT_FILTER`]
/// - Writes to stdout for consistent container logging behavior
pub fn init_logging_json() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(JSON_DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

/// Pick the output format from `LOG_FORMAT` (`json` or anything else for compact).
pub fn init_logging_from_env() {
    match std::env::var("LOG_FORMAT") {
        Ok(f) if f.eq_ignore_ascii_case("json") => init_logging_json(),
        _ => init_logging_default(),
    }
}
