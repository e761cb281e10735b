use std::env;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

pub const LOG_FORMAT_ENV: &str = "SENTINEL_LOG_FORMAT";
pub const LOG_DIR_ENV: &str = "SENTINEL_LOG_DIR";
const LOG_FILE_PREFIX: &str = "sentinel-backend.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global subscriber. Filtering follows `RUST_LOG` (default
/// `info`). The returned guard flushes the file writer and must live as
/// long as the process.
pub fn init_tracing() -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var(LOG_FORMAT_ENV)
        .map(|value| value.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if json {
        layers.push(fmt::layer().json().boxed());
    } else {
        layers.push(fmt::layer().boxed());
    }

    let mut guard = None;
    if let Some(dir) = env::var(LOG_DIR_ENV).ok().filter(|dir| !dir.trim().is_empty()) {
        std::fs::create_dir_all(&dir)?;
        let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
        let (writer, worker_guard) = tracing_appender::non_blocking(appender);
        layers.push(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .json()
                .boxed(),
        );
        guard = Some(worker_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;
    Ok(guard)
}
