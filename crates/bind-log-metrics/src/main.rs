// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::collections::BTreeMap;
use std::io::{self, Write as _};
use std::process::ExitCode;

use tokio::fs::File;
use tokio::io::{stdin, AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use influx_sender::{FieldValue, MetricsSender, SenderConfig};

mod config;
mod extractor;

use config::Config;
use extractor::{LogEvent, RecordExtractor};

#[tokio::main]
pub async fn main() -> ExitCode {
    if std::env::args().any(|arg| arg == "--version") {
        println!("{}", version_line());
        return ExitCode::SUCCESS;
    }

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("reading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let env_filter = format!("hyper=off,reqwest=off,{}", config.log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let sender_config = SenderConfig::new(&config.influx_host, &config.influx_db_name)
        .with_credentials(&config.influx_user, &config.influx_pass);
    let (metrics, mut delivery_errors) = match MetricsSender::new(sender_config) {
        Ok(pair) => pair,
        Err(e) => {
            error!("creating metrics sender: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Delivery failures arrive asynchronously; drain them into the log so
    // the flush loop is never waiting on us.
    tokio::spawn(async move {
        while let Some(err) = delivery_errors.recv().await {
            error!("metrics delivery failed: {err}");
        }
    });

    let input: Box<dyn AsyncRead + Unpin> = match config.input_file {
        Some(ref path) => match File::open(path).await {
            Ok(f) => Box::new(f),
            Err(e) => {
                error!("opening input file {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(stdin()),
    };

    let extractor = RecordExtractor::new();
    let mut stdout = io::stdout();
    let mut lines = BufReader::new(input).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                // Re-yield the line so the tool can sit inside a pipe. The
                // downstream consumer closing its end is a normal way for
                // this process to stop, not an error.
                match echo_line(&mut stdout, &line) {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!("stdout closed by consumer, stopping");
                        break;
                    }
                    Err(e) => {
                        error!("writing to stdout: {e}");
                        return ExitCode::FAILURE;
                    }
                }

                if let Some(event) = extractor.extract(&line) {
                    if let Err(e) = record_event(&metrics, event) {
                        error!("recording metrics point: {e}");
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("reading input: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    // Input is done; give the pending batch a final delivery attempt.
    debug!("input exhausted, shutting down");
    metrics.shutdown().await;

    ExitCode::SUCCESS
}

fn record_event(
    metrics: &MetricsSender,
    event: LogEvent,
) -> Result<(), influx_sender::PointError> {
    let tags = BTreeMap::from([
        ("client".to_string(), event.client),
        ("domain".to_string(), event.domain),
        ("type".to_string(), event.record_type),
    ]);
    let fields = BTreeMap::from([("count".to_string(), FieldValue::Integer(1))]);
    metrics.record_point(event.kind.series(), tags, fields)
}

fn version_line() -> String {
    format!("bind-log-metrics {}", env!("CARGO_PKG_VERSION"))
}

/// Echoes one line downstream. `Ok(false)` means the consumer closed the
/// pipe and the ingest loop should stop cleanly.
fn echo_line(out: &mut impl io::Write, line: &str) -> io::Result<bool> {
    match writeln!(out, "{line}") {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe;

    impl io::Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_echo_line_writes_line_with_newline() {
        let mut out = Vec::new();
        assert!(echo_line(&mut out, "client query").expect("write failed"));
        assert_eq!(out, b"client query\n");
    }

    #[test]
    fn test_echo_line_stops_cleanly_on_broken_pipe() {
        assert!(!echo_line(&mut ClosedPipe, "client query").expect("broken pipe is not an error"));
    }

    #[test]
    fn test_echo_line_propagates_other_errors() {
        struct FailingWriter;
        impl io::Write for FailingWriter {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::PermissionDenied))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let err = echo_line(&mut FailingWriter, "line").expect_err("error should propagate");
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_version_line() {
        assert_eq!(
            version_line(),
            format!("bind-log-metrics {}", env!("CARGO_PKG_VERSION"))
        );
        assert!(version_line().starts_with("bind-log-metrics "));
    }
}

