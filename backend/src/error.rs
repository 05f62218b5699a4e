use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Failures of the `/predict/{mode}` relay. Rendered as `{"error": "..."}`,
/// the shape the browser app reads its messages from.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Mode \"{0}\" is not yet supported.")]
    UnsupportedMode(String),
    #[error("No file part in the request.")]
    MissingFile,
    #[error("No selected file.")]
    EmptyFile,
    #[error("Uploaded image is too large.")]
    TooLarge,
    #[error("Malformed upload: {0}")]
    Multipart(String),
    #[error("Classifier unavailable: {0}")]
    Upstream(String),
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::UnsupportedMode(_)
            | GatewayError::MissingFile
            | GatewayError::EmptyFile
            | GatewayError::Multipart(_) => StatusCode::BAD_REQUEST,
            GatewayError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
