use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i32 },

    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),

    #[error("field map: {0}")]
    Fields(#[from] serde_json::Error),
}

impl AppError {
    pub fn movie_not_found(id: i32) -> Self {
        Self::NotFound { kind: "movie", id }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND.into_response(),
            err => {
                tracing::error!(error = %err, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            },
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
