use axum::http::StatusCode;

/// The only error surfaced over HTTP. Timer calls in a disallowed phase are
/// no-ops and invalid duration edits silently keep the prior value, so this
/// is reserved for rejecting an unconfirmed destructive reset.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
