use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::time::OffsetTime, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::{LogConfig, LogFormat, ObserveError};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Install the global subscriber described by `cfg`. Succeeds at most once per process.
pub fn init_logging(cfg: &LogConfig) -> Result<(), ObserveError> {
    let layer = build_layer(cfg)?;
    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| {
            if tracing::dispatcher::has_been_set() {
                ObserveError::AlreadyInstalled
            } else {
                ObserveError::Install(e.to_string())
            }
        })
}

fn build_layer(cfg: &LogConfig) -> Result<BoxedLayer, ObserveError> {
    let filter = filter(&cfg.filter)?;
    let layer = match cfg.format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(cfg.ansi)
            .with_target(cfg.targets)
            .with_timer(local_rfc3339())
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_target(cfg.targets)
            .with_timer(local_rfc3339())
            .with_filter(filter)
            .boxed(),
        LogFormat::Journald => journald(filter)?,
    };
    Ok(layer)
}

fn filter(directive: &str) -> Result<EnvFilter, ObserveError> {
    EnvFilter::try_new(directive).map_err(|e| ObserveError::BadDirective {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

/// The local offset can only be read reliably before other threads exist; UTC otherwise.
fn local_rfc3339() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald(filter: EnvFilter) -> Result<BoxedLayer, ObserveError> {
    let layer = tracing_journald::layer()
        .map_err(|e| ObserveError::Install(format!("journald: {e}")))?
        .with_syslog_identifier("psx-agentd".to_string());
    Ok(layer.with_filter(filter).boxed())
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald(_filter: EnvFilter) -> Result<BoxedLayer, ObserveError> {
    Err(ObserveError::JournaldUnavailable)
}
