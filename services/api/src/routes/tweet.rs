//! Tweet routes: posting, reading, deleting, and engagement

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::error;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AccessToken, require_auth, require_tweet_owner},
    repositories::RetweetOutcome,
    routes::user::resolve_failure,
    state::AppState,
    validation::validate_tweet_body,
};

/// Request for posting a tweet or a reply
#[derive(Deserialize)]
pub struct TweetRequest {
    pub body: String,
}

/// Create the router for the tweet resource
pub fn router(state: AppState) -> Router<AppState> {
    let owner_routes = Router::new()
        .route("/:id", delete(remove))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_tweet_owner,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let protected_routes = Router::new()
        .route("/create", post(create))
        .route("/:id/reply", post(reply))
        .route("/:id/like", patch(like))
        .route("/:id/unlike", patch(unlike))
        .route("/:id/retweet", patch(retweet))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/:id", get(fetch))
        .merge(owner_routes)
        .merge(protected_routes)
}

/// Post a new tweet
pub async fn create(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
    Json(payload): Json<TweetRequest>,
) -> ApiResult<impl IntoResponse> {
    let body = payload.body.trim();
    validate_body(body)?;

    let identity = state
        .identity
        .resolve(&token)
        .await
        .map_err(|e| resolve_failure(e, "Failure posting the tweet."))?;

    let tweet = state
        .tweet_repository
        .create(identity.id, body, None)
        .await
        .map_err(|e| {
            error!("Failed to create tweet: {}", e);
            ApiError::Internal("Failure posting the tweet.".to_string())
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "tweet": tweet,
            "message": "Tweet posted successfully",
        })),
    ))
}

/// Post a reply to the tweet named by the path id
pub async fn reply(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
    Path(parent_id): Path<Uuid>,
    Json(payload): Json<TweetRequest>,
) -> ApiResult<impl IntoResponse> {
    let body = payload.body.trim();
    validate_body(body)?;

    let identity = state
        .identity
        .resolve(&token)
        .await
        .map_err(|e| resolve_failure(e, "Failure posting the reply."))?;

    let tweet = state
        .tweet_repository
        .reply(parent_id, identity.id, body)
        .await
        .map_err(|e| {
            error!("Failed to post reply: {}", e);
            ApiError::Internal("Failure posting the reply.".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Tweet not available".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "tweet": tweet,
            "message": "Reply posted successfully",
        })),
    ))
}

/// Fetch a tweet with its author resolved; no token required
pub async fn fetch(
    State(state): State<AppState>,
    Path(tweet_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let tweet = state
        .tweet_repository
        .find_view_by_id(tweet_id)
        .await
        .map_err(|e| {
            error!("Failed to fetch tweet: {}", e);
            ApiError::Internal("Failure fetching the tweet.".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Tweet not available".to_string()))?;

    Ok(Json(json!({ "tweet": tweet })))
}

/// Delete a tweet; the ownership gate has already admitted the author
pub async fn remove(
    State(state): State<AppState>,
    Path(tweet_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state.tweet_repository.delete(tweet_id).await.map_err(|e| {
        error!("Failed to delete tweet: {}", e);
        ApiError::Internal("Failure deleting the tweet.".to_string())
    })?;

    if !deleted {
        return Err(ApiError::NotFound("Tweet not available".to_string()));
    }

    Ok(Json(json!({ "message": "Tweet deleted successfully" })))
}

/// Like a tweet; liking twice is a no-op
pub async fn like(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
    Path(tweet_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let identity = state
        .identity
        .resolve(&token)
        .await
        .map_err(|e| resolve_failure(e, "Failure liking the tweet."))?;

    let likes = state
        .tweet_repository
        .like(tweet_id, identity.id)
        .await
        .map_err(|e| {
            error!("Failed to like tweet: {}", e);
            ApiError::Internal("Failure liking the tweet.".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Tweet not available".to_string()))?;

    Ok(Json(json!({
        "likes": likes,
        "message": "Tweet liked successfully",
    })))
}

/// Remove a like; an absent like is a no-op
pub async fn unlike(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
    Path(tweet_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let identity = state
        .identity
        .resolve(&token)
        .await
        .map_err(|e| resolve_failure(e, "Failure unliking the tweet."))?;

    let likes = state
        .tweet_repository
        .unlike(tweet_id, identity.id)
        .await
        .map_err(|e| {
            error!("Failed to unlike tweet: {}", e);
            ApiError::Internal("Failure unliking the tweet.".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Tweet not available".to_string()))?;

    Ok(Json(json!({
        "likes": likes,
        "message": "Tweet unliked successfully",
    })))
}

/// Toggle a retweet on the tweet named by the path id
pub async fn retweet(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
    Path(tweet_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let identity = state
        .identity
        .resolve(&token)
        .await
        .map_err(|e| resolve_failure(e, "Failure retweeting the tweet."))?;

    let (outcome, reposts) = state
        .tweet_repository
        .toggle_retweet(tweet_id, identity.id)
        .await
        .map_err(|e| {
            error!("Failed to retweet tweet: {}", e);
            ApiError::Internal("Failure retweeting the tweet.".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Tweet not available".to_string()))?;

    let message = match outcome {
        RetweetOutcome::Retweeted => "Tweet retweeted successfully",
        RetweetOutcome::Undone => "Retweet undone",
    };

    Ok(Json(json!({
        "reposts": reposts,
        "message": message,
    })))
}

fn validate_body(body: &str) -> Result<(), ApiError> {
    if let Err(reason) = validate_tweet_body(body) {
        let mut errors = HashMap::new();
        errors.insert("body".to_string(), reason);
        return Err(ApiError::Unprocessable(errors));
    }
    Ok(())
}
