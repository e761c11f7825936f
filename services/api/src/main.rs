use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod config;
mod error;
mod identity;
mod jwt;
mod membership;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;
mod validation;

use common::database::{health_check, init_pool};
use tokio::net::TcpListener;

use crate::{
    config::AppConfig,
    identity::IdentityResolver,
    jwt::JwtService,
    repositories::{TweetRepository, UserRepository},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting chirp API service");

    // Configuration is read once here and handed to each component.
    let config = AppConfig::from_env()?;

    // Initialize database connection pool
    let pool = init_pool(&config.database).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let jwt_service = JwtService::new(config.jwt.clone());
    let user_repository = UserRepository::new(pool.clone());
    let tweet_repository = TweetRepository::new(pool.clone());
    let identity = IdentityResolver::new(jwt_service.clone(), user_repository.clone());

    let app_state = AppState {
        db_pool: pool,
        user_repository,
        tweet_repository,
        jwt_service,
        identity,
    };

    info!("chirp API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("chirp API service listening on 0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
