// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::auth::{parse_allowed_groups, verify_password, Role};
use crate::database::models::User;
use crate::database::service;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub allowed_groups: BTreeSet<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
    pub expires_in: i64,
}

/// POST /api/auth/login - Verify credentials and issue a session token
///
/// Input: `{"username": "...", "password": "..."}`
///
/// Unknown usernames and wrong passwords get the same 401 so the response does
/// not reveal which accounts exist.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;

    let username = request
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string);
    let password = request.password.filter(|p| !p.is_empty());

    let (Some(username), Some(password)) = (username, password) else {
        return Err(ApiError::bad_request("Username and password are required"));
    };

    let found = service::find_user_by_username(&state.pool, &username).await?;
    let user = tokio::task::spawn_blocking(move || authenticate(&username, found, &password))
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {}", e);
            ApiError::internal_server_error("Login failed")
        })??;

    let role = Role::from_db(&user.role);
    let allowed_groups = parse_allowed_groups(user.allowed_groups.as_deref());

    let claims = state
        .jwt
        .claims_for(user.id, user.username.clone(), role, allowed_groups.clone());
    let token = state.jwt.sign(&claims).map_err(|e| {
        tracing::error!("Token signing failed for user '{}': {}", user.username, e);
        ApiError::internal_server_error("Login failed")
    })?;

    tracing::info!("User '{}' logged in as {}", user.username, role);

    Ok(ApiResponse::success(LoginResponse {
        token,
        user: LoginUser {
            id: user.id,
            username: user.username,
            role,
            allowed_groups,
        },
        expires_in: state.jwt.expires_in(),
    }))
}

/// Check a password against the looked-up account. Blocks on bcrypt.
fn authenticate(username: &str, user: Option<User>, password: &str) -> Result<User, ApiError> {
    let Some(user) = user else {
        tracing::warn!("Login rejected for unknown user '{}'", username);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(password, &user.password) {
        tracing::warn!("Login rejected for user '{}': wrong password", username);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(password: &str) -> User {
        User {
            id: 7,
            username: "operator".to_string(),
            password: bcrypt::hash(password, 4).unwrap(),
            role: "entry_admin".to_string(),
            allowed_groups: Some("Pabrik".to_string()),
        }
    }

    #[test]
    fn unknown_user_and_wrong_password_look_the_same() {
        let unknown = authenticate("ghost", None, "rahasia").unwrap_err();
        let wrong = authenticate("operator", Some(account("rahasia")), "salah").unwrap_err();

        assert_eq!(unknown.status_code(), 401);
        assert_eq!(unknown.status_code(), wrong.status_code());
        assert_eq!(unknown.error_code(), wrong.error_code());
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn correct_password_returns_account() {
        let user = authenticate("operator", Some(account("rahasia")), "rahasia").unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "operator");
    }
}
