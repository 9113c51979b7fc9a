use axum::{extract::State, http::HeaderMap, response::Json};
use chrono::Utc;
use model::entities::analytics_event;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

use crate::auth::{resolve_event_actor, EventActor};
use crate::error::ApiError;
use crate::schemas::{AppState, ErrorResponse};

/// An analytics event to record
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EventIn {
    pub event_name: String,
    /// Opaque structured payload; stored serialized
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventAck {
    pub ok: bool,
    pub id: i32,
}

/// Record an analytics event, attributed to the caller when a usable
/// bearer token accompanies the request and anonymous otherwise.
/// Attribution failures never reject the event.
#[utoipa::path(
    post,
    path = "/analytics/event",
    tag = "analytics",
    request_body = EventIn,
    responses(
        (status = 200, description = "Event recorded", body = EventAck),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, headers))]
pub async fn log_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<EventIn>,
) -> Result<Json<EventAck>, ApiError> {
    // Resolve first, log second; a failed resolution is an explicit
    // anonymous attribution, not an error.
    let actor = resolve_event_actor(&state, &headers).await;
    let user_id = match actor {
        EventActor::User(id) => Some(id),
        EventActor::Anonymous => None,
    };

    debug!(event_name = %event.event_name, ?actor, "recording analytics event");

    let record = analytics_event::ActiveModel {
        user_id: Set(user_id),
        event_name: Set(event.event_name.clone()),
        meta_json: Set(event.meta.as_ref().map(|meta| meta.to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let stored = record.insert(&state.db).await?;

    Ok(Json(EventAck {
        ok: true,
        id: stored.id,
    }))
}
