use rocket::{
    response::{self, Responder},
    Request,
};
use sea_orm::DbErr;
use thiserror::Error;

use crate::models::response::APIResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} does not exist")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

impl From<AppError> for APIResponse {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(_) => APIResponse::error(404, err.to_string()),
            AppError::Forbidden(_) => APIResponse::error(403, err.to_string()),
            AppError::Database(_) | AppError::Io(_) | AppError::Serialize(_) => {
                tracing::error!(error = %err, "request failed");
                APIResponse::error(500, "Internal server error")
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        APIResponse::from(self).respond_to(req)
    }
}
