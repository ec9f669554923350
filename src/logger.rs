use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Initialize tracing for the process: env-filtered stderr output plus an
/// optional daily-rolling log file. Returns the file writer guard; hold it
/// for the lifetime of the process or buffered lines are lost on exit.
pub fn init_tracing(log_level: &str, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level))
        .add_directive("hyper=off".parse().expect("static directive"))
        .add_directive("reqwest=off".parse().expect("static directive"));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "replyflow.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
            Registry::default()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            Registry::default().with(filter).with(stderr_layer).init();
            None
        }
    }
}
