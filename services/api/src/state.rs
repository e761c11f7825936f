//! Application state shared across handlers

use sqlx::PgPool;

use crate::identity::IdentityResolver;
use crate::jwt::JwtService;
use crate::repositories::{TweetRepository, UserRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_repository: UserRepository,
    pub tweet_repository: TweetRepository,
    pub jwt_service: JwtService,
    pub identity: IdentityResolver,
}
