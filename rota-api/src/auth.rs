use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, middleware::auth::AdminClaims, state::AppState};

#[derive(Debug, Deserialize)]
struct AdminLoginRequest {
    pin: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/auth/admin", post(login_admin))
}

/// PIN login for the admin panel. Issues a short-lived token; there is no
/// ambient "is admin" flag anywhere else.
async fn login_admin(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if req.pin != state.auth.admin_pin {
        return Err(AppError::AuthenticationError("Invalid PIN".to_string()));
    }

    let claims = AdminClaims {
        sub: "admin".to_string(),
        role: "ADMIN".to_string(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse { token }))
}
