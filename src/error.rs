use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Movie data file not found: {0}")]
    DataFileNotFound(String),

    #[error("Could not read movie data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Movie data is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Ranking model file not found: {0}")]
    ModelNotFound(String),

    #[error("Ranking model is malformed: {0}")]
    ModelFormat(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("There's no movie such as '{query}'. Please enter another title")]
    NoMatch {
        query: String,
        suggestions: Vec<String>,
    },

    #[error("Index {index} is out of range for a table of {len} rows; the ranking model is stale")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NoMatch { .. } | AppError::ModelNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::IndexOutOfRange { .. } => StatusCode::CONFLICT,
            AppError::DataFileNotFound(_)
            | AppError::Csv(_)
            | AppError::MissingColumn(_)
            | AppError::ModelFormat(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::NoMatch { suggestions, .. } => json!({
                "error": self.to_string(),
                "suggestions": suggestions,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
