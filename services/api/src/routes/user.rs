//! User routes: registration, login, and the social graph

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{patch, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use tracing::error;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    identity::IdentityError,
    middleware::{AccessToken, require_auth},
    models::{NewUser, PublicUser},
    repositories::{FollowOutcome, UnfollowOutcome},
    state::AppState,
    validation::{validate_password, validate_username},
};

/// Request for registration and login
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Response for registration and login
#[derive(Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
    pub message: String,
}

/// Create the router for the user resource
pub fn router(state: AppState) -> Router<AppState> {
    let graph_routes = Router::new()
        .route("/:id/follow", patch(follow))
        .route("/:id/unfollow", patch(unfollow))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(graph_routes)
}

/// Register a new user and issue its first token pair
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    let username = payload.username.trim();
    let password = payload.password.trim();

    let mut errors = HashMap::new();
    if let Err(reason) = validate_username(username) {
        errors.insert("username".to_string(), reason);
    }
    if let Err(reason) = validate_password(password) {
        errors.insert("password".to_string(), reason);
    }
    if !errors.is_empty() {
        return Err(ApiError::Unprocessable(errors));
    }

    let existing = state
        .user_repository
        .find_by_username(username)
        .await
        .map_err(|e| {
            error!("Failed to look up username: {}", e);
            ApiError::Internal("Failure adding new user.".to_string())
        })?;

    if existing.is_some() {
        return Err(ApiError::Conflict(
            "User already exists. Please login to continue".to_string(),
        ));
    }

    let user = state
        .user_repository
        .create(&NewUser {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await
        .map_err(|e| {
            error!("Failed to create user: {}", e);
            ApiError::Internal("Failure adding new user.".to_string())
        })?;

    let (access_token, refresh_token) = issue_tokens(&state, &user.username, "Failure adding new user.")?;

    let response = AuthResponse {
        user: PublicUser::from(&user),
        access_token,
        refresh_token,
        message: "User registered successfully".to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in an existing user and issue a fresh token pair
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    let username = payload.username.trim();
    let password = payload.password.trim();

    let mut errors = HashMap::new();
    if username.is_empty() {
        errors.insert(
            "username".to_string(),
            "Username is required in the request body".to_string(),
        );
    }
    if let Err(reason) = validate_password(password) {
        errors.insert("password".to_string(), reason);
    }
    if !errors.is_empty() {
        return Err(ApiError::Unprocessable(errors));
    }

    let user = state
        .user_repository
        .find_by_username(username)
        .await
        .map_err(|e| {
            error!("Failed to look up username: {}", e);
            ApiError::Internal("Failure logging in the user.".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("User not found. Please register to continue".to_string()))?;

    let password_matches = state
        .user_repository
        .verify_password(&user, password)
        .await
        .map_err(|e| {
            error!("Failed to verify password: {}", e);
            ApiError::Internal("Failure logging in the user.".to_string())
        })?;

    if !password_matches {
        return Err(ApiError::BadRequest("Wrong password. Please retry".to_string()));
    }

    let (access_token, refresh_token) = issue_tokens(&state, &user.username, "Failure logging in the user.")?;

    let response = AuthResponse {
        user: PublicUser::from(&user),
        access_token,
        refresh_token,
        message: "User logged in successfully".to_string(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Follow the user named by the path id
pub async fn follow(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
    Path(followee_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let identity = state
        .identity
        .resolve(&token)
        .await
        .map_err(|e| resolve_failure(e, "Failure following the user."))?;

    if identity.id == followee_id {
        return Err(ApiError::BadRequest("You cannot follow yourself".to_string()));
    }

    let outcome = state
        .user_repository
        .follow(&identity, followee_id)
        .await
        .map_err(|e| {
            error!("Failed to follow user: {}", e);
            ApiError::Internal("Failure following the user.".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("User not available".to_string()))?;

    let message = match outcome {
        FollowOutcome::Followed => "Followed successfully",
        FollowOutcome::AlreadyFollowing => "Already following",
    };

    Ok(Json(json!({ "message": message })))
}

/// Unfollow the user named by the path id
pub async fn unfollow(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
    Path(followee_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let identity = state
        .identity
        .resolve(&token)
        .await
        .map_err(|e| resolve_failure(e, "Failure unfollowing the user."))?;

    if identity.id == followee_id {
        return Err(ApiError::BadRequest("You cannot unfollow yourself".to_string()));
    }

    let outcome = state
        .user_repository
        .unfollow(&identity, followee_id)
        .await
        .map_err(|e| {
            error!("Failed to unfollow user: {}", e);
            ApiError::Internal("Failure unfollowing the user.".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("User not available".to_string()))?;

    let message = match outcome {
        UnfollowOutcome::Unfollowed => "Unfollowed successfully",
        UnfollowOutcome::NotFollowing => "Not following",
    };

    Ok(Json(json!({ "message": message })))
}

fn issue_tokens(
    state: &AppState,
    username: &str,
    internal_message: &str,
) -> Result<(String, String), ApiError> {
    let access_token = state.jwt_service.generate_access_token(username).map_err(|e| {
        error!("Failed to generate access token: {}", e);
        ApiError::Internal(internal_message.to_string())
    })?;
    let refresh_token = state.jwt_service.generate_refresh_token(username).map_err(|e| {
        error!("Failed to generate refresh token: {}", e);
        ApiError::Internal(internal_message.to_string())
    })?;
    Ok((access_token, refresh_token))
}

/// Map an identity-resolution failure to a response error
///
/// Token problems deny the request; only a store failure surfaces as the
/// handler's internal error.
pub(crate) fn resolve_failure(err: IdentityError, internal_message: &str) -> ApiError {
    match err {
        IdentityError::Token(e) => ApiError::Unauthorized(e.to_string()),
        IdentityError::UnknownUser => ApiError::Unauthorized("Unauthorized".to_string()),
        IdentityError::Store(e) => {
            error!("Identity resolution failed: {}", e);
            ApiError::Internal(internal_message.to_string())
        }
    }
}
