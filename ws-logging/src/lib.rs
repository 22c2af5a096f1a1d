//! Per-run logging for the `ws` tool.
//!
//! A [`LogSession`] writes every event to stdout and to a log file named
//! after the action and start time. Output is `time | LEVEL | message` lines,
//! or JSON when `LOG_FORMAT=json`.

use chrono::{DateTime, Local};
use std::{
    env, fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{Dispatch, Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields, MakeWriter},
    prelude::*,
    registry,
    registry::LookupSpan,
    EnvFilter,
};
use ws_core::{Result, WsError};

// SDK internals are noisy at info.
const QUIET_TARGETS: [&str; 4] = [
    "aws_config=warn",
    "aws_smithy_runtime=warn",
    "aws_sdk_workspaces=warn",
    "hyper=warn",
];

// --- Custom "Tee" Writer ---
struct Tee<A, B> {
    a: A,
    b: B,
}

impl<A, B> Write for Tee<A, B>
where
    A: Write,
    B: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res_a = self.a.write_all(buf).map(|_| buf.len());
        let res_b = self.b.write_all(buf).map(|_| buf.len());
        res_a.or(res_b)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.a.flush()?;
        self.b.flush()
    }
}

#[derive(Clone)]
struct MakeTee<A, B> {
    make_a: A,
    make_b: B,
}

impl<'a, A, B, W1, W2> MakeWriter<'a> for MakeTee<A, B>
where
    A: MakeWriter<'a, Writer = W1>,
    B: MakeWriter<'a, Writer = W2>,
    W1: Write + 'a,
    W2: Write + 'a,
{
    type Writer = Tee<W1, W2>;
    fn make_writer(&'a self) -> Self::Writer {
        Tee {
            a: self.make_a.make_writer(),
            b: self.make_b.make_writer(),
        }
    }
}

// --- "time | LEVEL | message" lines ---
struct PipeFormat;

impl<S, N> FormatEvent<S, N> for PipeFormat
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'w> FormatFields<'w> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        write!(writer, "{} | {} | ", now, event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Name of the log file for one invocation: `YYYYMMDDHHMMSS-workspace-<action>.log`.
pub fn log_file_name(action: &str, started: DateTime<Local>) -> String {
    format!("{}-workspace-{}.log", started.format("%Y%m%d%H%M%S"), action)
}

/// Logging for one run of the tool.
///
/// Events are written both to stdout and to a per-invocation log file. The
/// session does not install itself globally; callers run their work inside
/// [`LogSession::in_scope`] so library code can log through plain `tracing`
/// macros and tests can skip logging entirely.
pub struct LogSession {
    dispatch: Dispatch,
    path: PathBuf,
    _guard: WorkerGuard,
}

impl LogSession {
    /// Create `log_dir` if needed and open the log file for `action`.
    ///
    /// `LOG_LEVEL` (or `RUST_LOG`) sets the filter, default `info`.
    /// `LOG_FORMAT=json` switches both sinks to JSON lines.
    pub fn open(action: &str, log_dir: &Path) -> Result<Self> {
        fs::create_dir_all(log_dir)?;
        let file_name = log_file_name(action, Local::now());
        let path = log_dir.join(&file_name);

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "human".to_string());

        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => {
                let directives = std::iter::once(log_level.as_str())
                    .chain(QUIET_TARGETS)
                    .collect::<Vec<_>>()
                    .join(",");
                EnvFilter::try_new(directives)
                    .map_err(|e| WsError::Config(format!("invalid LOG_LEVEL: {e}")))?
            }
        };

        let file_appender = tracing_appender::rolling::never(log_dir, &file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let tee_writer = MakeTee {
            make_a: std::io::stdout,
            make_b: non_blocking,
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(tee_writer);
        let subscriber = registry().with(env_filter);
        let dispatch = if log_format == "json" {
            Dispatch::new(subscriber.with(fmt_layer.json()))
        } else {
            Dispatch::new(subscriber.with(fmt_layer.event_format(PipeFormat)))
        };

        let session = Self {
            dispatch,
            path,
            _guard: guard,
        };
        session.in_scope(|| tracing::info!("Log file: {}", session.path.display()));
        Ok(session)
    }

    /// Path of this run's log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` with this session as the active subscriber.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name_uses_action_and_timestamp() {
        let started = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            log_file_name("start", started),
            "20240309070501-workspace-start.log"
        );
    }

    #[test]
    fn test_session_writes_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let path = {
            let session = LogSession::open("status", &log_dir).unwrap();
            session.in_scope(|| tracing::warn!("Unresolved inputs: ghost"));
            session.path().to_path_buf()
        };

        assert!(path.starts_with(&log_dir));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("-workspace-status.log"));
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("| INFO | Log file:"));
        assert!(contents.contains("| WARN | Unresolved inputs: ghost"));
    }
}
