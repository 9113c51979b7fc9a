use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::crop_rule::{self, join_seasons};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::schemas::{AppState, ErrorResponse};

/// Request body for creating or replacing a crop rule.
///
/// Bounds are stored as given; a rule with min above max is accepted and
/// simply scores degenerately.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CropRuleIn {
    pub name: String,
    /// Season labels, kept in the order given
    pub seasons: Vec<String>,
    pub temp_min: f64,
    pub temp_max: f64,
    pub rain_min: f64,
    pub rain_max: f64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Crop rule response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CropRuleOut {
    pub id: i32,
    pub name: String,
    pub seasons: Vec<String>,
    pub temp_min: f64,
    pub temp_max: f64,
    pub rain_min: f64,
    pub rain_max: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crop_rule::Model> for CropRuleOut {
    fn from(model: crop_rule::Model) -> Self {
        Self {
            seasons: model.seasons(),
            id: model.id,
            name: model.name,
            temp_min: model.temp_min,
            temp_max: model.temp_max,
            rain_min: model.rain_min,
            rain_max: model.rain_max,
            active: model.active,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteAck {
    pub ok: bool,
}

/// List all crop rules
#[utoipa::path(
    get,
    path = "/admin/crop_rules",
    tag = "admin",
    responses(
        (status = 200, description = "Rules retrieved successfully", body = Vec<CropRuleOut>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip_all)]
pub async fn list_rules(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CropRuleOut>>, ApiError> {
    let rules = crop_rule::Entity::find().all(&state.db).await?;
    debug!("retrieved {} crop rules", rules.len());
    Ok(Json(rules.into_iter().map(CropRuleOut::from).collect()))
}

/// Create a crop rule
#[utoipa::path(
    post,
    path = "/admin/crop_rules",
    tag = "admin",
    request_body = CropRuleIn,
    responses(
        (status = 201, description = "Rule created successfully", body = CropRuleOut),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state, request), fields(rule_name = %request.name))]
pub async fn create_rule(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(request): Json<CropRuleIn>,
) -> Result<(StatusCode, Json<CropRuleOut>), ApiError> {
    let rule = crop_rule::ActiveModel {
        name: Set(request.name.clone()),
        seasons_csv: Set(join_seasons(&request.seasons)),
        temp_min: Set(request.temp_min),
        temp_max: Set(request.temp_max),
        rain_min: Set(request.rain_min),
        rain_max: Set(request.rain_max),
        active: Set(request.active),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = rule.insert(&state.db).await?;

    info!(rule_id = created.id, name = %created.name, "crop rule created");
    Ok((StatusCode::CREATED, Json(CropRuleOut::from(created))))
}

/// Replace a crop rule
#[utoipa::path(
    put,
    path = "/admin/crop_rules/{rule_id}",
    tag = "admin",
    params(
        ("rule_id" = i32, Path, description = "Crop rule ID"),
    ),
    request_body = CropRuleIn,
    responses(
        (status = 200, description = "Rule updated successfully", body = CropRuleOut),
        (status = 404, description = "Rule not found", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state, request))]
pub async fn update_rule(
    _admin: AdminUser,
    Path(rule_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<CropRuleIn>,
) -> Result<Json<CropRuleOut>, ApiError> {
    let existing = crop_rule::Entity::find_by_id(rule_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!(rule_id, "crop rule not found for update");
            ApiError::NotFound("Rule not found".to_string())
        })?;

    let mut rule: crop_rule::ActiveModel = existing.into();
    rule.name = Set(request.name.clone());
    rule.seasons_csv = Set(join_seasons(&request.seasons));
    rule.temp_min = Set(request.temp_min);
    rule.temp_max = Set(request.temp_max);
    rule.rain_min = Set(request.rain_min);
    rule.rain_max = Set(request.rain_max);
    rule.active = Set(request.active);

    let updated = rule.update(&state.db).await?;
    info!(rule_id, "crop rule updated");
    Ok(Json(CropRuleOut::from(updated)))
}

/// Delete a crop rule
#[utoipa::path(
    delete,
    path = "/admin/crop_rules/{rule_id}",
    tag = "admin",
    params(
        ("rule_id" = i32, Path, description = "Crop rule ID"),
    ),
    responses(
        (status = 200, description = "Rule deleted successfully", body = DeleteAck),
        (status = 404, description = "Rule not found", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip(_admin, state))]
pub async fn delete_rule(
    _admin: AdminUser,
    Path(rule_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<DeleteAck>, ApiError> {
    let result = crop_rule::Entity::delete_by_id(rule_id)
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        warn!(rule_id, "crop rule not found for deletion");
        return Err(ApiError::NotFound("Rule not found".to_string()));
    }

    info!(rule_id, "crop rule deleted");
    Ok(Json(DeleteAck { ok: true }))
}
