use axum::{
    extract::State,
    response::Json,
    Form,
};
use chrono::Utc;
use model::entities::user;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::{hash_password, verify_password, CurrentUser};
use crate::error::ApiError;
use crate::schemas::{AppState, ErrorResponse};

/// Request body for creating an account
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SignupRequest {
    /// Username (must be unique)
    pub username: String,
    pub password: String,
}

/// OAuth2-style password login form
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Issued bearer token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

impl Token {
    fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Identity of the calling user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
}

/// Register a new account and return a token for it.
///
/// The very first account ever created, or any account whose username is
/// "admin" in any casing, is granted administrator privilege at creation;
/// there is no way to grant or revoke it afterwards through this API.
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created, token issued", body = Token),
        (status = 400, description = "Username already exists", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<Token>, ApiError> {
    debug!(username = %request.username, "signup attempt");

    if user::Model::find_by_username(&state.db, &request.username)
        .await?
        .is_some()
    {
        warn!(username = %request.username, "signup rejected, username taken");
        return Err(ApiError::Validation("Username already exists".to_string()));
    }

    let table_was_empty = user::Entity::find().one(&state.db).await?.is_none();
    let is_admin = table_was_empty || request.username.eq_ignore_ascii_case("admin");

    let new_user = user::ActiveModel {
        username: Set(request.username.clone()),
        hashed_password: Set(hash_password(&request.password)?),
        is_admin: Set(is_admin),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = new_user.insert(&state.db).await?;

    info!(
        user_id = created.id,
        username = %created.username,
        is_admin = created.is_admin,
        "user created"
    );

    let token = state.auth.issue_token(&created.username)?;
    Ok(Json(Token::bearer(token)))
}

/// Exchange username/password form credentials for a token.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    responses(
        (status = 200, description = "Token issued", body = Token),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<Token>, ApiError> {
    debug!(username = %form.username, "login attempt");

    let user = match user::Model::find_by_username(&state.db, &form.username).await? {
        Some(user) if verify_password(&form.password, &user.hashed_password) => user,
        _ => {
            warn!(username = %form.username, "login rejected");
            return Err(ApiError::Authentication("Invalid credentials".to_string()));
        }
    };

    let token = state.auth.issue_token(&user.username)?;
    info!(user_id = user.id, "login succeeded");
    Ok(Json(Token::bearer(token)))
}

/// Who am I?
#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    responses(
        (status = 200, description = "Calling user", body = MeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_token" = []))
)]
#[instrument(skip_all)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: user.id,
        username: user.username,
        is_admin: user.is_admin,
    })
}
