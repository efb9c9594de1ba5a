//! Concurrent stdout/stderr line pumping.
//!
//! Supervised commands can emit non-UTF8 bytes, so lines are read as raw
//! bytes and decoded lossily; a reader task must not die on invalid UTF-8.

use std::sync::Arc;

use chrono::Utc;
use execd_core::LogKind;
use execd_core::ports::OutputConsumer;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, warn};

/// Pumps two byte streams line-by-line into a set of consumers.
///
/// [`pump`](Self::pump) drives both streams concurrently, one reader task
/// per stream, and resolves once both hit end-of-stream; every consumer's
/// close hook then fires exactly once. Each line is timestamped once and
/// delivered to all consumers before the next line of that stream is read,
/// so consumers observe one stream as a strictly ordered sequence. Nothing
/// is guaranteed about ordering *between* the two streams.
pub struct StreamPumper<O, E> {
    stdout: O,
    stderr: E,
    consumers: Vec<Arc<dyn OutputConsumer>>,
}

impl<O, E> StreamPumper<O, E>
where
    O: AsyncRead + Unpin + Send + 'static,
    E: AsyncRead + Unpin + Send + 'static,
{
    pub fn new(stdout: O, stderr: E) -> Self {
        Self {
            stdout,
            stderr,
            consumers: Vec::new(),
        }
    }

    /// Register a consumer. Consumers are notified in registration order.
    pub fn add_consumer(&mut self, consumer: Arc<dyn OutputConsumer>) {
        self.consumers.push(consumer);
    }

    /// Pump until both streams are exhausted, then close every consumer.
    pub async fn pump(self) {
        let Self {
            stdout,
            stderr,
            consumers,
        } = self;
        let consumers: Arc<[Arc<dyn OutputConsumer>]> = consumers.into();

        let out = tokio::spawn(pump_stream(stdout, Arc::clone(&consumers), LogKind::Stdout));
        let err = tokio::spawn(pump_stream(stderr, Arc::clone(&consumers), LogKind::Stderr));

        // A join error means a consumer panicked; the close hooks still run
        // so the other consumers learn the streams are gone.
        if let Err(e) = out.await {
            warn!(error = %e, "stdout pump task failed");
        }
        if let Err(e) = err.await {
            warn!(error = %e, "stderr pump task failed");
        }

        for consumer in consumers.iter() {
            consumer.on_close();
        }
    }
}

async fn pump_stream<R>(stream: R, consumers: Arc<[Arc<dyn OutputConsumer>]>, kind: LogKind)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf: Vec<u8> = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                let line = String::from_utf8_lossy(&buf);
                let time = Utc::now();
                for consumer in consumers.iter() {
                    match kind {
                        LogKind::Stdout => consumer.on_stdout(&line, time),
                        LogKind::Stderr => consumer.on_stderr(&line, time),
                    }
                }
            }
            Err(e) => {
                // Read errors other than EOF close this stream without
                // touching the other one.
                debug!(?kind, error = %e, "stream reader exiting on read error");
                break;
            }
        }
    }
}
