use axum::{
    extract::{Query, State},
    response::Json,
};
use model::entities::place_cache;
use sea_orm::{EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::schemas::{AppState, ErrorResponse};
use crate::weather::Geocoder;

#[derive(Debug, Deserialize, IntoParams)]
pub struct GeocodeQuery {
    /// Place name, e.g. "Guntur" or "Guntur, AP"
    pub query: String,
}

/// A geocoding candidate
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GeocodeCandidate {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Geocode a free-text place name against the upstream API.
#[utoipa::path(
    get,
    path = "/geocode",
    tag = "data",
    params(GeocodeQuery),
    responses(
        (status = 200, description = "Candidate places", body = Vec<GeocodeCandidate>),
        (status = 502, description = "Upstream weather API failure", body = ErrorResponse),
        (status = 500, description = "Weather API key not configured", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn geocode(
    State(state): State<AppState>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<Vec<GeocodeCandidate>>, ApiError> {
    let results = state.weather.geocode(&params.query, 5).await?;
    debug!(query = %params.query, count = results.len(), "geocode results");

    Ok(Json(
        results
            .iter()
            .map(|place| GeocodeCandidate {
                name: place.display_name(),
                lat: place.lat,
                lon: place.lon,
            })
            .collect(),
    ))
}

/// A cached place with its popularity counter
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CachedPlace {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub hits: i32,
}

impl From<place_cache::Model> for CachedPlace {
    fn from(model: place_cache::Model) -> Self {
        Self {
            name: model.display_name,
            lat: model.latitude,
            lon: model.longitude,
            hits: model.hit_count,
        }
    }
}

/// List every cached place, most requested first.
#[utoipa::path(
    get,
    path = "/states",
    tag = "data",
    responses(
        (status = 200, description = "Cached places by popularity", body = Vec<CachedPlace>)
    )
)]
#[instrument(skip(state))]
pub async fn list_cached_places(
    State(state): State<AppState>,
) -> Result<Json<Vec<CachedPlace>>, ApiError> {
    let places = place_cache::Entity::find()
        .order_by_desc(place_cache::Column::HitCount)
        .order_by_desc(place_cache::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(places.into_iter().map(CachedPlace::from).collect()))
}
