use std::path::Path;

use once_cell::sync::OnceCell;
use tracing_subscriber::{
    fmt, fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::error::{EngineError, EngineResult};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();
static LOGGER_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

const DEFAULT_LOG_DIRECTIVES: &str =
    "info,engine::cache=debug,engine::sources=debug,engine::validation=debug";

/// Initialize the global tracing subscriber.
///
/// Honors `RUST_LOG` when set; otherwise falls back to the engine defaults.
/// When `log_dir` is given, logs additionally go to a daily-rolling file in
/// that directory. Repeated calls are no-ops.
pub fn init_logging(log_dir: Option<&Path>) -> EngineResult<()> {
    LOGGER_INIT
        .get_or_try_init(|| {
            let env_filter = EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_DIRECTIVES))
                .map_err(|err| EngineError::other(format!("failed to parse log filter: {err}")))?;

            let registry = tracing_subscriber::registry().with(env_filter);

            match log_dir {
                Some(dir) => {
                    std::fs::create_dir_all(dir)?;

                    let file_appender = tracing_appender::rolling::daily(dir, "mindbeat.log");
                    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                    LOGGER_GUARD
                        .set(guard)
                        .map_err(|_| EngineError::other("logger already initialized"))?;

                    registry
                        .with(
                            fmt::layer()
                                .with_writer(non_blocking)
                                .with_ansi(false)
                                .with_target(true)
                                .with_timer(UtcTime::rfc_3339()),
                        )
                        .with(
                            fmt::layer()
                                .with_target(false)
                                .with_timer(UtcTime::rfc_3339()),
                        )
                        .init();
                }
                None => {
                    registry
                        .with(
                            fmt::layer()
                                .with_target(true)
                                .with_timer(UtcTime::rfc_3339()),
                        )
                        .init();
                }
            }

            Ok(())
        })
        .map(|_| ())
}
