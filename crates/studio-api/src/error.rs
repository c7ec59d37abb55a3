use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Non autenticato")]
    Unauthorized,

    #[error("Thread non trovato")]
    ThreadNotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Persistence error: {0}")]
    Persist(#[from] studio_persist::PersistError),

    #[error("Connector error: {0}")]
    Connector(#[from] studio_connect::ConnectorError),

    #[error("Authentication provider error: {0}")]
    AuthProvider(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::ThreadNotFound(ref id) => {
                tracing::debug!(thread_id = %id, "Thread not found");
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            // Parser details stay in the log
            ApiError::InvalidBody(ref e) => {
                tracing::error!("Invalid request body: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Errore interno del server".to_string())
            }
            // Thread ids are chosen by the client, so a clash is the caller's mistake
            ApiError::Persist(studio_persist::PersistError::ThreadExists(ref id)) => {
                (StatusCode::BAD_REQUEST, format!("Thread già esistente: {}", id))
            }
            ApiError::Persist(ref e) => {
                tracing::error!("Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Errore interno del server".to_string())
            }
            ApiError::Connector(studio_connect::ConnectorError::ConnectionNotFound(ref id)) => {
                tracing::warn!(connection_id = %id, "Connection not found for caller");
                (StatusCode::NOT_FOUND, "Connessione non trovata".to_string())
            }
            ApiError::Connector(ref e) => {
                tracing::error!("Connector error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Errore interno del server".to_string())
            }
            ApiError::AuthProvider(ref e) => {
                tracing::error!("Authentication provider error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Errore interno del server".to_string())
            }
            ApiError::Model(ref e) => {
                tracing::error!("Model error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Errore interno del server".to_string())
            }
            ApiError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Errore di configurazione".to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Read a required non-blank string field from a request body
pub(crate) fn required(value: Option<String>, message: &str) -> ApiResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}
