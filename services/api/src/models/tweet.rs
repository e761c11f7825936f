//! Tweet model and composed views

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Tweet entity
///
/// `likes` and `reposts` are sets of user ids; `replies` is an append-only
/// sequence of tweet ids. `parent` is present iff this tweet is a reply.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tweet {
    pub id: Uuid,
    pub body: String,
    pub author: Uuid,
    pub likes: Vec<Uuid>,
    pub reposts: Vec<Uuid>,
    pub parent: Option<Uuid>,
    pub replies: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public fields of a tweet's author
#[derive(Debug, Clone, Serialize)]
pub struct TweetAuthor {
    pub id: Uuid,
    pub username: String,
}

/// Tweet with its author resolved, as returned by the read path
#[derive(Debug, Clone, Serialize)]
pub struct TweetView {
    pub id: Uuid,
    pub body: String,
    pub author: TweetAuthor,
    pub likes: Vec<Uuid>,
    pub reposts: Vec<Uuid>,
    pub parent: Option<Uuid>,
    pub replies: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}
