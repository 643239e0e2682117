use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Everything that can go wrong between the gateway and the upstream API.
/// Callers treat every variant as "fetch failed" and only surface the message.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("malformed upstream response: {0}")]
    Malformed(String),

    #[error("upstream returned no articles")]
    Empty,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid count parameter")]
    InvalidCount,

    #[error("{label}")]
    Fetch {
        label: &'static str,
        #[source]
        source: GatewayError,
    },

    #[error("Failed to encode response")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn fetch(label: &'static str, source: GatewayError) -> Self {
        ApiError::Fetch { label, source }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidCount => "Count must be a number between 1 and 20".to_string(),
            ApiError::Fetch { source, .. } => source.to_string(),
            ApiError::Encode(e) => e.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidCount => StatusCode::BAD_REQUEST,
            ApiError::Fetch { .. } | ApiError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string(),
            "message": self.message(),
        }))
    }
}

/// Failures seen by the feed while asking a source for a batch.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("network error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{message}")]
    Service {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("Request timed out")]
    Timeout,
}
