use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::io;

use tokio::time::sleep;
use tracing::{debug, warn};

use super::config::RetryConfig;

/// How a request failed before the server gave a definitive answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportFailure {
    /// The connection could not be established. Covers refused connections,
    /// connect timeouts and TLS handshake or certificate failures.
    Connect,
    /// An established connection was reset, aborted or closed mid-request.
    ConnectionLost,
    /// No data arrived within the read timeout after connecting.
    Timeout,
    Other,
}

impl TransportFailure {
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        // reqwest reports TLS errors from its connector, so they land here too
        if err.is_connect() {
            return TransportFailure::Connect;
        }
        if err.is_timeout() {
            return TransportFailure::Timeout;
        }

        let mut source = err.source();
        while let Some(cause) = source {
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                match io_err.kind() {
                    io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof => return TransportFailure::ConnectionLost,
                    io::ErrorKind::TimedOut => return TransportFailure::Timeout,
                    _ => {}
                }
            }
            // Server hung up before sending a response, e.g. a stale keep-alive
            if let Some(hyper_err) = cause.downcast_ref::<hyper::Error>() {
                if hyper_err.is_incomplete_message() {
                    return TransportFailure::ConnectionLost;
                }
            }
            source = cause.source();
        }

        TransportFailure::Other
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransportFailure::Connect => "connection failed",
            TransportFailure::ConnectionLost => "connection lost",
            TransportFailure::Timeout => "timed out",
            TransportFailure::Other => "transport error",
        };
        f.write_str(label)
    }
}

/// Lets the retry loop tell transient transport failures apart from
/// definitive answers.
pub trait RetryClassify {
    /// `None` when the error is not a transport failure at all
    fn transport_failure(&self) -> Option<TransportFailure>;
}

/// Runs `attempt_fn` until it succeeds, fails with an error the config does
/// not retry, or `max_attempts` is spent. The last error is returned as-is.
pub async fn retry_with_backoff<T, E, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    mut attempt_fn: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryClassify + fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    let mut delay = config.initial_delay();

    loop {
        match attempt_fn().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}/{}", operation, attempt, max_attempts);
                }
                return Ok(value);
            }
            Err(e) => {
                if !config.should_retry(e.transport_failure()) {
                    return Err(e);
                }

                if attempt >= max_attempts {
                    warn!("{} failed after {} attempts: {}", operation, attempt, e);
                    return Err(e);
                }

                warn!(
                    "{} failed: {}, retrying in {}ms (attempt {}/{})",
                    operation,
                    e,
                    delay.as_millis(),
                    attempt,
                    max_attempts
                );

                sleep(delay).await;
                delay = config.next_delay(delay);
                attempt += 1;
            }
        }
    }
}
