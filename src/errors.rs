//! Error types for cyclone-impact.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors from a prediction request.
///
/// Every variant is the same failure as far as the form is concerned:
/// the request failed and the previous results stay on screen.
#[derive(Error, Debug)]
pub enum PredictError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// API returned an error status
    #[error("Prediction API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid response structure
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl PredictError {
    /// Short reason suitable for showing next to the form.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => "prediction service timed out".into(),
            Self::Http(_) => "could not reach the prediction service".into(),
            Self::Parse(_) | Self::InvalidResponse(_) => {
                "prediction service sent an unreadable response".into()
            }
            Self::Api { status, .. } => format!("prediction service returned HTTP {status}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_reason_mentions_status() {
        let err = PredictError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.reason(), "prediction service returned HTTP 500");
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_parse_reason() {
        let err: PredictError = serde_json::from_str::<Vec<u8>>("{").unwrap_err().into();
        assert_eq!(err.reason(), "prediction service sent an unreadable response");
    }
}
