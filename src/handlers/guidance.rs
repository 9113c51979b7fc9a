use agronomy::{classify, rank_crops, round2, summarize, Season, SuitabilityTag, WeatherMetrics};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Datelike;
use model::entities::crop_rule;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::places::resolve_place;
use crate::schemas::{AppState, ErrorResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SeasonNowQuery {
    /// Any place; geocoded live
    pub state: String,
}

/// Current season for a location
#[derive(Debug, Serialize, ToSchema)]
pub struct SeasonNowResponse {
    pub state: String,
    pub lat: f64,
    pub lon: f64,
    pub month: u32,
    pub season: Season,
    pub metrics: WeatherMetrics,
}

/// Infer the current cropping season for a place from the calendar month
/// biased by the near-term forecast.
#[utoipa::path(
    get,
    path = "/season_now",
    tag = "data",
    params(SeasonNowQuery),
    responses(
        (status = 200, description = "Season inferred", body = SeasonNowResponse),
        (status = 404, description = "Place not found", body = ErrorResponse),
        (status = 502, description = "Upstream weather API failure", body = ErrorResponse),
        (status = 500, description = "Weather API key not configured", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn season_now(
    State(state): State<AppState>,
    Query(params): Query<SeasonNowQuery>,
) -> Result<Json<SeasonNowResponse>, ApiError> {
    let place = resolve_place(&state.db, state.weather.as_ref(), &params.state).await?;
    let forecast = state.weather.forecast(place.latitude, place.longitude).await?;
    let metrics = summarize(&forecast.samples());

    let month = state.clock.now().month();
    let season = classify(month, &metrics);
    info!(place = %place.display_name, month, %season, "season inferred");

    Ok(Json(SeasonNowResponse {
        state: place.display_name,
        lat: place.latitude,
        lon: place.longitude,
        month,
        season,
        metrics,
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LiveCropsQuery {
    /// Any place; geocoded live
    pub state: String,
    /// Season label; inferred from weather when omitted
    pub season: Option<String>,
}

/// The tolerance band a suitability verdict was scored against
#[derive(Debug, Serialize, ToSchema)]
pub struct RuleBounds {
    pub temp_min: f64,
    pub temp_max: f64,
    pub rain_min: f64,
    pub rain_max: f64,
}

/// One crop's suitability for the requested location and season
#[derive(Debug, Serialize, ToSchema)]
pub struct CropSuitability {
    pub crop: String,
    pub season: String,
    pub avg_temp_c: Option<f64>,
    pub total_rain_mm: Option<f64>,
    pub score: f64,
    pub tag: SuitabilityTag,
    pub rule: RuleBounds,
}

/// Ranked crop guidance for a location
#[derive(Debug, Serialize, ToSchema)]
pub struct LiveCropsResponse {
    pub state: String,
    pub lat: f64,
    pub lon: f64,
    pub season: String,
    pub metrics: WeatherMetrics,
    pub crops: Vec<CropSuitability>,
}

/// Score every active crop rule for the place's current weather and rank
/// the season's crops best-first.
#[utoipa::path(
    get,
    path = "/live_crops",
    tag = "data",
    params(LiveCropsQuery),
    responses(
        (status = 200, description = "Ranked crop suitability", body = LiveCropsResponse),
        (status = 404, description = "Place not found", body = ErrorResponse),
        (status = 502, description = "Upstream weather API failure", body = ErrorResponse),
        (status = 500, description = "Weather API key not configured", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn live_crops(
    State(state): State<AppState>,
    Query(params): Query<LiveCropsQuery>,
) -> Result<Json<LiveCropsResponse>, ApiError> {
    let place = resolve_place(&state.db, state.weather.as_ref(), &params.state).await?;
    let forecast = state.weather.forecast(place.latitude, place.longitude).await?;
    let metrics = summarize(&forecast.samples());

    let season = match params.season {
        Some(season) => season,
        None => classify(state.clock.now().month(), &metrics).to_string(),
    };

    let rules = crop_rule::Entity::find()
        .filter(crop_rule::Column::Active.eq(true))
        .all(&state.db)
        .await?;
    let ranked = rank_crops(&rules, &season, &metrics);
    debug!(
        place = %place.display_name,
        %season,
        candidates = ranked.len(),
        "ranked crops"
    );

    let crops = ranked
        .into_iter()
        .map(|entry| CropSuitability {
            crop: entry.rule.name.clone(),
            season: season.clone(),
            avg_temp_c: metrics.avg_temp_c.map(round2),
            total_rain_mm: metrics.total_rain_mm.map(round2),
            score: entry.score,
            tag: entry.tag,
            rule: RuleBounds {
                temp_min: entry.rule.temp_min,
                temp_max: entry.rule.temp_max,
                rain_min: entry.rule.rain_min,
                rain_max: entry.rule.rain_max,
            },
        })
        .collect();

    Ok(Json(LiveCropsResponse {
        state: place.display_name,
        lat: place.latitude,
        lon: place.longitude,
        season,
        metrics,
        crops,
    }))
}
