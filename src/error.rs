use thiserror::Error;

/// Error taxonomy for everything that crosses the gateway boundary.
///
/// Raw `rspotify` errors never leave the adapter; they are mapped into one
/// of these three categories so callers can decide what is retryable:
/// - `Auth` — credentials invalid or expired; re-authenticate, do not retry.
/// - `Api` — remote failure, transient by default; retry at the batch level.
/// - `Validation` — caller bug (bad parameter); fix the call, never retry.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("spotify api error{}: {message}", fmt_status(.status))]
    Api {
        status: Option<u16>,
        message: String,
    },

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}

impl GatewayError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        GatewayError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        GatewayError::Api {
            status: None,
            message: message.into(),
        }
    }

    /// True for errors that a caller may reasonably retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Api { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_status() {
        let err = GatewayError::Api {
            status: Some(503),
            message: "service unavailable".into(),
        };
        let text = err.to_string();
        assert!(text.contains("503"), "missing status in: {text}");
        assert!(text.contains("service unavailable"));
    }

    #[test]
    fn test_validation_never_transient() {
        assert!(!GatewayError::validation("limit", "out of range").is_transient());
        assert!(GatewayError::api("timeout").is_transient());
    }
}
