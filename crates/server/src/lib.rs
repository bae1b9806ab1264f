use api_types::UnknownVariant;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use auth::{AuthConfig, AuthKeys};
pub use server::{ServerState, router, run_with_listener};

mod accounts;
mod auth;
mod categories;
mod descriptions;
mod family;
mod health;
mod medical;
mod parameters;
mod payments;
mod pending;
mod receipts;
mod server;
mod transactions;
mod transfers;
mod validation;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::Engine(err) => write!(f, "{err}"),
            ServerError::Generic(err) => f.write_str(err),
        }
    }
}

impl std::error::Error for ServerError {}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidValue(_) => StatusCode::BAD_REQUEST,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<UnknownVariant> for ServerError {
    fn from(value: UnknownVariant) -> Self {
        Self::Generic(value.to_string())
    }
}

/// Legacy `select` routes answer 404 instead of an empty list.
fn non_empty<T>(items: Vec<T>, what: &str) -> Result<Json<Vec<T>>, ServerError> {
    if items.is_empty() {
        return Err(EngineError::KeyNotFound(format!("no active {what}")).into());
    }
    Ok(Json(items))
}
