use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::TripRequest;
use crate::error::{Result, TripError};
use crate::itinerary::Itinerary;
use crate::planner::TripPlanner;

#[derive(Debug, Deserialize)]
struct PlanRequest {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(flatten)]
    trip: TripRequest,
}

#[derive(Debug, Serialize)]
struct PlanResponse {
    itinerary: Option<Itinerary>,
    reply: String,
}

struct ApiError(TripError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// HTTP routes over a shared planner.
pub fn router(planner: Arc<TripPlanner>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/plan", post(plan))
        .route("/sessions/:id", delete(reset_session))
        .with_state(planner)
}

pub async fn serve(planner: Arc<TripPlanner>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router(planner).into_make_service())
        .await
        .map_err(|err| TripError::Protocol(format!("server error: {err}")))?;
    Ok(())
}

async fn plan(
    State(planner): State<Arc<TripPlanner>>,
    Json(req): Json<PlanRequest>,
) -> std::result::Result<Json<PlanResponse>, ApiError> {
    let session = req.session_id.as_deref().unwrap_or_default();
    let outcome = planner.plan(session, &req.trip).await.map_err(ApiError)?;
    Ok(Json(PlanResponse {
        itinerary: outcome.itinerary,
        reply: outcome.reply,
    }))
}

async fn reset_session(
    State(planner): State<Arc<TripPlanner>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let removed = planner.reset(&id).await;
    Json(json!({ "session_id": id, "removed": removed }))
}
