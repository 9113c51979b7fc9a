use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use model::entities::user;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::schemas::AppState;

/// Access tokens expire a fixed 24 hours after issuance.
const TOKEN_TTL_HOURS: i64 = 24;

/// Signed claim set carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username the token was issued to.
    pub sub: String,
    /// Expiry as a unix timestamp.
    pub exp: usize,
}

/// Wall-clock abstraction. Token expiry (and the month used for season
/// inference) reads time through this so tests can pin it.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Issues and verifies bearer tokens. Verification fails closed: any
/// decode error, bad signature or expired claim is an authentication
/// failure.
pub struct AuthService {
    secret: String,
    clock: Arc<dyn TimeSource>,
}

impl AuthService {
    pub fn new(secret: String, clock: Arc<dyn TimeSource>) -> Self {
        Self { secret, clock }
    }

    pub fn issue_token(&self, username: &str) -> Result<String, ApiError> {
        let expires_at = self.clock.now() + Duration::hours(TOKEN_TTL_HOURS);
        let claims = Claims {
            sub: username.to_string(),
            exp: expires_at.timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Token encoding failed: {e}")))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::default();
        // Expiry is checked against the injected clock below, not the
        // library's view of the system time.
        validation.validate_exp = false;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            debug!("Token decode failed: {}", e);
            ApiError::Authentication("Could not validate credentials".to_string())
        })?;

        if data.claims.exp as i64 <= self.clock.now().timestamp() {
            return Err(ApiError::Authentication("Token has expired".to_string()));
        }

        Ok(data.claims)
    }
}

/// Hashes a password with a salted, cost-carrying scheme. The cost factor
/// is embedded in the hash and re-checked on verification.
pub fn hash_password(plain: &str) -> Result<String, ApiError> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {e}")))
}

pub fn verify_password(plain: &str, hashed: &str) -> bool {
    bcrypt::verify(plain, hashed).unwrap_or(false)
}

/// Extracts the token from an `Authorization: Bearer ...` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Extractor for routes that require a valid bearer token. Resolves the
/// token's subject to a stored user or rejects with 401.
pub struct CurrentUser(pub user::Model);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Authentication("Missing bearer token".to_string()))?;
        let claims = state.auth.verify_token(token)?;
        let user = user::Model::find_by_username(&state.db, &claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(subject = %claims.sub, "token subject has no matching user");
                ApiError::Authentication("Could not validate credentials".to_string())
            })?;
        Ok(CurrentUser(user))
    }
}

/// Extractor for admin-only routes: a valid token whose user holds the
/// administrator flag, or 403.
pub struct AdminUser(pub user::Model);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(ApiError::Authorization("Admin access required".to_string()));
        }
        Ok(AdminUser(user))
    }
}

/// Attribution for an analytics event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventActor {
    User(i32),
    Anonymous,
}

/// Best-effort identity resolution for analytics events. Every failure
/// mode (no header, malformed header, bad token, unknown subject, lookup
/// error) resolves to an explicit [`EventActor::Anonymous`]; nothing is
/// surfaced to the caller.
pub async fn resolve_event_actor(state: &AppState, headers: &HeaderMap) -> EventActor {
    let Some(token) = bearer_token(headers) else {
        return EventActor::Anonymous;
    };
    let Ok(claims) = state.auth.verify_token(token) else {
        debug!("analytics event carried an unusable token, logging as anonymous");
        return EventActor::Anonymous;
    };
    match user::Model::find_by_username(&state.db, &claims.sub).await {
        Ok(Some(user)) => EventActor::User(user.id),
        _ => EventActor::Anonymous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// A clock pinned to a fixed instant.
    struct FixedTimeSource(DateTime<Utc>);

    impl TimeSource for FixedTimeSource {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn service_at(secret: &str, at: DateTime<Utc>) -> AuthService {
        AuthService::new(secret.to_string(), Arc::new(FixedTimeSource(at)))
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_token_round_trip() {
        let service = service_at("secret", issued_at());
        let token = service.issue_token("ravi").unwrap();
        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "ravi");
    }

    #[test]
    fn test_token_valid_just_before_expiry() {
        let issuer = service_at("secret", issued_at());
        let token = issuer.issue_token("ravi").unwrap();

        let verifier = service_at("secret", issued_at() + Duration::hours(23));
        assert!(verifier.verify_token(&token).is_ok());
    }

    #[test]
    fn test_token_expires_after_24_hours() {
        let issuer = service_at("secret", issued_at());
        let token = issuer.issue_token("ravi").unwrap();

        let verifier = service_at("secret", issued_at() + Duration::hours(25));
        let err = verifier.verify_token(&token).unwrap_err();
        assert!(matches!(err, ApiError::Authentication(_)));
    }

    #[test]
    fn test_garbage_token_fails_closed() {
        let service = service_at("secret", issued_at());
        assert!(service.verify_token("not-a-token").is_err());
        assert!(service.verify_token("").is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = service_at("other-secret", issued_at());
        let token = issuer.issue_token("ravi").unwrap();

        let verifier = service_at("secret", issued_at());
        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hashed = hash_password("hunter2").unwrap();
        assert_ne!(hashed, "hunter2");
        assert!(verify_password("hunter2", &hashed));
        assert!(!verify_password("wrong", &hashed));
    }

    #[test]
    fn test_verify_password_with_invalid_hash_is_false() {
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, "Bearer tok123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("tok123"));
    }
}
