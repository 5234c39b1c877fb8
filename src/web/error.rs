use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::app::IngestError;

impl IngestError {
    /// Text sent to the client; causes stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            IngestError::InvalidInput(reason) => reason.clone(),
            IngestError::UpstreamUnavailable(_) => String::from("Error making request to weather API"),
            IngestError::UpstreamError { .. } => String::from("Error from weather API"),
            IngestError::UpstreamMalformed(_) => String::from("Error decoding JSON response from weather API"),
            IngestError::StorageError { .. } => String::from("Error inserting into record store"),
            IngestError::StorageUnavailable(_) => String::from("Error getting documents from record store"),
        }
    }
}

impl ResponseError for IngestError {
    fn status_code(&self) -> StatusCode {
        match self {
            IngestError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            IngestError::UpstreamError { status } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.public_message())
    }
}
