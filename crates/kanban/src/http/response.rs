//! Mapping errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use minijinja::context;
use serde_json::json;
use tracing::{debug, error};

use super::AppState;
use crate::error::Error;

impl Error {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn log_failure(error: &Error, status: StatusCode) {
    if status.is_server_error() {
        error!(error = %error, status = status.as_u16(), "request failed");
    } else if let Some(kind) = error.not_found_kind() {
        debug!(kind, error = %error, "lookup failed");
    } else {
        debug!(error = %error, status = status.as_u16(), "request rejected");
    }
}

/// JSON errors: `{"error": "<message>"}`.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        log_failure(&self, status);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// An error raised by an HTML route, rendered as a page.
#[derive(Debug)]
pub(super) struct PageError {
    state: AppState,
    error: Error,
}

impl PageError {
    pub(super) fn new(state: &AppState, error: Error) -> Self {
        Self {
            state: state.clone(),
            error,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        log_failure(&self.error, status);
        let rendered = self
            .state
            .templates
            .get_template("error.html")
            .and_then(|tmpl| {
                tmpl.render(context!(
                    status => status.as_u16(),
                    message => self.error.to_string(),
                ))
            });
        match rendered {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                error!(error = %err, "failed to render error page");
                (status, self.error.to_string()).into_response()
            }
        }
    }
}
