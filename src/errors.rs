use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use strum_macros::Display;
use thiserror::Error;
use utoipa::ToSchema;

/// Every console failure, whichever page or call produced it.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Backend unreachable: {0}")]
    Transport(String),

    #[error("Session expired or missing, please sign in again")]
    Unauthorized,

    #[error("{0}")]
    Credentials(String),

    #[error("Backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected backend payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("{0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Session,
    Backend,
    Validation,
    Conflict,
    NotFound,
    Internal,
}

/// The one shape in which a failure is shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ErrorBanner {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<String>,
    #[serde(skip)]
    pub status: u16,
}

impl ErrorBanner {
    pub fn with_retry(mut self, href: impl Into<String>) -> Self {
        self.retry = Some(href.into());
        self
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// `{"error": banner}` with the banner's status.
    pub fn respond(self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self }))
    }
}

impl ConsoleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsoleError::Transport(_) => ErrorKind::Network,
            ConsoleError::Unauthorized | ConsoleError::Credentials(_) => ErrorKind::Session,
            ConsoleError::Rejected { status: 404, .. } | ConsoleError::NotFound(_) => {
                ErrorKind::NotFound
            }
            ConsoleError::Rejected { status: 400 | 422, .. } | ConsoleError::Validation { .. } => {
                ErrorKind::Validation
            }
            ConsoleError::Rejected { .. } | ConsoleError::Decode(_) => ErrorKind::Backend,
            ConsoleError::Conflict(_) => ErrorKind::Conflict,
            ConsoleError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn banner(&self) -> ErrorBanner {
        ErrorBanner {
            kind: self.kind(),
            message: self.to_string(),
            field: match self {
                ConsoleError::Validation { field, .. } => Some((*field).to_string()),
                _ => None,
            },
            retry: None,
            status: self.status_code().as_u16(),
        }
    }
}

impl ResponseError for ConsoleError {
    fn status_code(&self) -> StatusCode {
        match self {
            ConsoleError::Transport(_) => StatusCode::BAD_GATEWAY,
            ConsoleError::Unauthorized | ConsoleError::Credentials(_) => StatusCode::UNAUTHORIZED,
            ConsoleError::Rejected { status: 404, .. } => StatusCode::NOT_FOUND,
            ConsoleError::Rejected { status: 400 | 422, .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ConsoleError::Rejected { .. } => StatusCode::BAD_GATEWAY,
            ConsoleError::Decode(_) => StatusCode::BAD_GATEWAY,
            ConsoleError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ConsoleError::Conflict(_) => StatusCode::CONFLICT,
            ConsoleError::NotFound(_) => StatusCode::NOT_FOUND,
            ConsoleError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.banner().respond()
    }
}
