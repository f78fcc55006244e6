//! API error types

use serde::Deserialize;

/// Errors that can occur during API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response from the backend.
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Backend `detail`, or `HTTP <status> - <reason>` when absent.
        message: String,
    },

    /// Network error during API call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid base URL or path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse API response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },

    /// The call was abandoned because its cancellation token fired.
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Builds an HTTP error from a failed response body.
    ///
    /// The backend reports failures as `{"detail": "..."}`. Validation errors
    /// may carry a list of objects instead of a string; their `msg` fields are
    /// joined. Anything else falls back to the status line.
    pub fn from_body(status: u16, reason: Option<&str>, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .and_then(ErrorDetail::into_message);

        let message = detail.unwrap_or_else(|| {
            format!("HTTP {} - {}", status, reason.unwrap_or("Unknown Status"))
        });

        Self::http(status, message)
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the call was cancelled rather than failed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<ErrorDetail>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Text(String),
    Items(Vec<ErrorItem>),
}

#[derive(Deserialize)]
struct ErrorItem {
    msg: Option<String>,
}

impl ErrorDetail {
    fn into_message(self) -> Option<String> {
        match self {
            Self::Text(text) if !text.is_empty() => Some(text),
            Self::Text(_) => None,
            Self::Items(items) => {
                let joined = items
                    .into_iter()
                    .filter_map(|i| i.msg)
                    .collect::<Vec<_>>()
                    .join("; ");
                (!joined.is_empty()).then_some(joined)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string_is_message() {
        let err = ApiError::from_body(404, Some("Not Found"), r#"{"detail":"Listing not found"}"#);
        assert_eq!(err.to_string(), "Listing not found");
        assert_eq!(err.status_code(), Some(404));
    }

    #[test]
    fn test_validation_detail_joined() {
        let body = r#"{"detail":[{"msg":"field required"},{"msg":"value is not a valid integer"}]}"#;
        let err = ApiError::from_body(422, Some("Unprocessable Entity"), body);
        assert_eq!(err.to_string(), "field required; value is not a valid integer");
    }

    #[test]
    fn test_missing_detail_falls_back_to_status_line() {
        let err = ApiError::from_body(500, Some("Internal Server Error"), "<html>oops</html>");
        assert_eq!(err.to_string(), "HTTP 500 - Internal Server Error");

        let err = ApiError::from_body(502, None, "{}");
        assert_eq!(err.to_string(), "HTTP 502 - Unknown Status");
    }

    #[test]
    fn test_cancelled_is_distinguishable() {
        assert!(ApiError::Cancelled.is_cancelled());
        assert!(!ApiError::http(400, "bad").is_cancelled());
    }
}
