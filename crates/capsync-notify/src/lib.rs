//! ntfy notification publisher.
//!
//! One HTTP POST per run: the summary body as plain text, with the title,
//! priority, and categorical tag carried in headers the way ntfy expects
//! them. Delivery failure is the caller's problem to tolerate; it never
//! changes the run's outcome.

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

use std::time::Duration;

use capsync_core::Notification;
use tracing::debug;
use url::Url;

/// Request timeout for notification delivery.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised by the publisher.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The configured endpoint is not a valid URL.
    #[error("invalid notification endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// Transport-level failure.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The sink answered with a non-success status.
    #[error("notification endpoint returned {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },
}

/// Result type for notify operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Publishes run notifications to an ntfy topic endpoint.
pub struct NtfyPublisher {
    http: reqwest::Client,
    endpoint: Url,
}

impl NtfyPublisher {
    /// Create a publisher for the given topic endpoint URL.
    ///
    /// # Errors
    /// Returns [`NotifyError::InvalidEndpoint`] when the URL does not parse,
    /// [`NotifyError::Http`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str) -> NotifyResult<Self> {
        let endpoint = Url::parse(endpoint)?;
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, endpoint })
    }

    /// POST the notification.
    ///
    /// # Errors
    /// Returns [`NotifyError::Rejected`] on a non-success status,
    /// [`NotifyError::Http`] on transport failure.
    pub async fn publish(&self, notification: &Notification) -> NotifyResult<()> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header("Title", &notification.title)
            .header("Priority", notification.priority.to_string())
            .header("Tags", notification.tags.to_string())
            .body(notification.body.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(endpoint = %self.endpoint, "notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_endpoint_is_rejected_at_construction() {
        let result = NtfyPublisher::new("not a url");
        assert!(matches!(result, Err(NotifyError::InvalidEndpoint(_))));
    }

    #[test]
    fn rejected_display_carries_status() {
        let e = NotifyError::Rejected { status: 429 };
        assert_eq!(e.to_string(), "notification endpoint returned 429");
    }
}
