use api_types::health::Health;
use axum::{Json, extract::State, http::StatusCode};

use crate::server::ServerState;

/// Liveness plus a database round trip.
pub async fn get(State(state): State<ServerState>) -> (StatusCode, Json<Health>) {
    match state.engine.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Health {
                status: "UP".to_string(),
            }),
        ),
        Err(err) => {
            tracing::error!("health check failed: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Health {
                    status: "DOWN".to_string(),
                }),
            )
        }
    }
}
