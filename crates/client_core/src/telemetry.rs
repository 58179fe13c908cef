//! Tracing subscriber init: pretty logs for local runs, JSON lines otherwise.

use data_runtime::configs::telemetry::TelemetryCfg;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. A second call is a no-op.
pub fn init_telemetry(cfg: &TelemetryCfg) {
    let filter = EnvFilter::try_new(&cfg.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    let _ = if cfg.pretty {
        registry.with(fmt::layer().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().json()).try_init()
    };
}
