#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fmt;
    use std::time::Duration;

    use tokio::time::Instant;

    use super::super::{retry_with_backoff, RetryClassify, RetryConfig, TransportFailure};

    #[derive(Debug, Clone, PartialEq)]
    enum FakeError {
        Transport(TransportFailure),
        Status(u16),
    }

    impl fmt::Display for FakeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                FakeError::Transport(failure) => write!(f, "transport: {}", failure),
                FakeError::Status(code) => write!(f, "HTTP {}", code),
            }
        }
    }

    impl RetryClassify for FakeError {
        fn transport_failure(&self) -> Option<TransportFailure> {
            match self {
                FakeError::Transport(failure) => Some(*failure),
                FakeError::Status(_) => None,
            }
        }
    }

    /// Runs the retry loop against a scripted sequence of outcomes and returns
    /// the result plus the instant of every attempt.
    async fn run_script(
        config: &RetryConfig,
        script: Vec<Result<&'static str, FakeError>>,
    ) -> (Result<&'static str, FakeError>, Vec<Instant>) {
        let attempts = RefCell::new(Vec::new());
        let script = RefCell::new(script.into_iter());

        let result = retry_with_backoff(config, "test operation", || {
            attempts.borrow_mut().push(Instant::now());
            let next = script
                .borrow_mut()
                .next()
                .unwrap_or(Err(FakeError::Status(599)));
            async move { next }
        })
        .await;

        (result, attempts.into_inner())
    }

    fn gaps(instants: &[Instant]) -> Vec<Duration> {
        instants.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_failures_exhaust_five_attempts_with_doubling_delays() {
        let config = RetryConfig::default();
        let script = vec![Err(FakeError::Transport(TransportFailure::Connect)); 6];

        let (result, attempts) = run_script(&config, script).await;

        assert_eq!(result, Err(FakeError::Transport(TransportFailure::Connect)));
        assert_eq!(attempts.len(), 5);

        let expected = [10, 20, 40, 80];
        for (gap, secs) in gaps(&attempts).iter().zip(expected) {
            let wanted = Duration::from_secs(secs);
            assert!(
                *gap >= wanted && *gap < wanted + Duration::from_secs(1),
                "expected ~{:?}, got {:?}",
                wanted,
                gap
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_definitive_status_is_not_retried() {
        let config = RetryConfig::default();
        let script = vec![Err(FakeError::Status(403)), Ok("unreachable")];

        let (result, attempts) = run_script(&config, script).await;

        assert_eq!(result, Err(FakeError::Status(403)));
        assert_eq!(attempts.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_timeout_is_not_retried() {
        let config = RetryConfig::default();
        let script = vec![Err(FakeError::Transport(TransportFailure::Timeout)), Ok("unreachable")];

        let (result, attempts) = run_script(&config, script).await;

        assert_eq!(result, Err(FakeError::Transport(TransportFailure::Timeout)));
        assert_eq!(attempts.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let config = RetryConfig::default();
        let script = vec![
            Err(FakeError::Transport(TransportFailure::ConnectionLost)),
            Err(FakeError::Transport(TransportFailure::Connect)),
            Ok("uploaded"),
        ];

        let (result, attempts) = run_script(&config, script).await;

        assert_eq!(result, Ok("uploaded"));
        assert_eq!(attempts.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadened_classification_retries_timeouts() {
        let config = RetryConfig {
            max_attempts: 3,
            retry_on: vec![TransportFailure::Connect, TransportFailure::Timeout],
            ..RetryConfig::default()
        };
        let script = vec![Err(FakeError::Transport(TransportFailure::Timeout)); 3];

        let (result, attempts) = run_script(&config, script).await;

        assert_eq!(result, Err(FakeError::Transport(TransportFailure::Timeout)));
        assert_eq!(attempts.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_runs_once() {
        let config = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        };
        let script = vec![Err(FakeError::Transport(TransportFailure::Connect)), Ok("unreachable")];

        let (_, attempts) = run_script(&config, script).await;
        assert_eq!(attempts.len(), 1);
    }
}
