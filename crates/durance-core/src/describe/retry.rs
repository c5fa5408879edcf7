//! Which description failures are transient, and how long to wait between tries.

use crate::error::ServiceError;
use std::time::Duration;

/// Longest pause between two attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Map a failed `send()` to a `ServiceError`.
///
/// Refused connections, DNS failures and client-side timeouts carry no HTTP
/// status and are reported as `Unreachable`.
pub(crate) fn send_error(provider: &str, e: reqwest::Error) -> ServiceError {
    let message = format!("{provider} request failed: {e}");
    if e.is_connect() || e.is_timeout() {
        ServiceError::Unreachable { message }
    } else {
        ServiceError::Request {
            message,
            status_code: e.status().map(|s| s.as_u16()),
        }
    }
}

/// Whether another attempt could succeed where this one failed.
///
/// Only rate limiting (429) and server-side (5xx) statuses count for HTTP
/// responses; anything else the provider answered with will not change.
pub fn is_retryable(error: &ServiceError) -> bool {
    match error {
        ServiceError::Timeout { .. } | ServiceError::Unreachable { .. } => true,
        ServiceError::Request {
            status_code: Some(code),
            ..
        } => *code == 429 || (500..=599).contains(code),
        ServiceError::Request {
            status_code: None, ..
        }
        | ServiceError::Image { .. } => false,
    }
}

/// Pause before retry number `attempt` (0-based): `base * 2^attempt`, capped.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay).min(MAX_BACKOFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> ServiceError {
        ServiceError::Request {
            message: format!("HTTP {code}"),
            status_code: Some(code),
        }
    }

    #[test]
    fn transient_failures_are_retried() {
        assert!(is_retryable(&ServiceError::Timeout { timeout_ms: 30_000 }));
        assert!(is_retryable(&ServiceError::Unreachable {
            message: "refused".into()
        }));
        assert!(is_retryable(&status(429)));
        assert!(is_retryable(&status(503)));
    }

    #[test]
    fn answered_requests_are_not_retried() {
        assert!(!is_retryable(&status(400)));
        assert!(!is_retryable(&status(403)));
        assert!(!is_retryable(&ServiceError::Image {
            message: "no such file".into()
        }));
    }

    #[test]
    fn message_text_does_not_decide() {
        let err = ServiceError::Request {
            message: "could not connect, timed out".into(),
            status_code: None,
        };
        assert!(!is_retryable(&err));
    }

    #[tokio::test]
    async fn closed_port_is_unreachable_and_retryable() {
        let client = reqwest::Client::new();
        let e = client
            .post("http://127.0.0.1:1/v1beta/models/m:generateContent")
            .send()
            .await
            .unwrap_err();

        let err = send_error("Gemini", e);
        assert!(matches!(err, ServiceError::Unreachable { .. }), "{err:?}");
        assert!(err.to_string().starts_with("Gemini request failed"));
        assert!(is_retryable(&err));
    }

    #[test]
    fn backoff_doubles_then_caps() {
        assert_eq!(backoff_duration(0, 1000), Duration::from_millis(1000));
        assert_eq!(backoff_duration(1, 1000), Duration::from_millis(2000));
        assert_eq!(backoff_duration(3, 1000), Duration::from_millis(8000));
        assert_eq!(backoff_duration(10, 1000), MAX_BACKOFF);
        assert_eq!(backoff_duration(u32::MAX, 1000), MAX_BACKOFF);
    }
}
