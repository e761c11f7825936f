//! Tweet repository for database operations
//!
//! Owns content store access and the engagement mutations. Toggles are
//! read-modify-write against a single row with no version check; the last
//! writer's column snapshot wins, matching the persistence model the rest
//! of the service assumes.

use anyhow::Result;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::membership;
use crate::models::{Tweet, TweetAuthor, TweetView};

/// Outcome of the retweet toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetweetOutcome {
    Retweeted,
    Undone,
}

/// Tweet repository
#[derive(Clone)]
pub struct TweetRepository {
    pool: PgPool,
}

impl TweetRepository {
    /// Create a new tweet repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new tweet; `parent` is set iff the tweet is a reply
    pub async fn create(&self, author: Uuid, body: &str, parent: Option<Uuid>) -> Result<Tweet> {
        info!("Creating tweet for author {}", author);

        let row = sqlx::query(
            r#"
            INSERT INTO tweets (body, author, parent)
            VALUES ($1, $2, $3)
            RETURNING id, body, author, likes, reposts, parent, replies, created_at, updated_at
            "#,
        )
        .bind(body)
        .bind(author)
        .bind(parent)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::tweet_from_row(&row))
    }

    /// Find a tweet by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tweet>> {
        let row = sqlx::query(
            r#"
            SELECT id, body, author, likes, reposts, parent, replies, created_at, updated_at
            FROM tweets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::tweet_from_row))
    }

    /// Find a tweet by ID with its author's public fields resolved
    ///
    /// The author is joined in explicitly by the read path; there is no
    /// store-level auto-expansion.
    pub async fn find_view_by_id(&self, id: Uuid) -> Result<Option<TweetView>> {
        let row = sqlx::query(
            r#"
            SELECT t.id, t.body, t.likes, t.reposts, t.parent, t.replies, t.created_at,
                   u.id AS author_id, u.username AS author_username
            FROM tweets t
            INNER JOIN users u ON u.id = t.author
            WHERE t.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| TweetView {
            id: row.get("id"),
            body: row.get("body"),
            author: TweetAuthor {
                id: row.get("author_id"),
                username: row.get("author_username"),
            },
            likes: row.get("likes"),
            reposts: row.get("reposts"),
            parent: row.get("parent"),
            replies: row.get("replies"),
            created_at: row.get("created_at"),
        }))
    }

    /// Delete a tweet by ID
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Add `user_id` to the tweet's likes; liking twice is a no-op
    ///
    /// Returns the updated likes list, or `None` when the tweet does not
    /// exist.
    pub async fn like(&self, tweet_id: Uuid, user_id: Uuid) -> Result<Option<Vec<Uuid>>> {
        let Some(tweet) = self.find_by_id(tweet_id).await? else {
            return Ok(None);
        };

        let mut likes = tweet.likes;
        if membership::insert_id(&mut likes, user_id) {
            self.set_likes(tweet_id, &likes).await?;
        }

        Ok(Some(likes))
    }

    /// Remove `user_id` from the tweet's likes; an absent id is a no-op
    pub async fn unlike(&self, tweet_id: Uuid, user_id: Uuid) -> Result<Option<Vec<Uuid>>> {
        let Some(tweet) = self.find_by_id(tweet_id).await? else {
            return Ok(None);
        };

        let mut likes = tweet.likes;
        if membership::remove_id(&mut likes, user_id) {
            self.set_likes(tweet_id, &likes).await?;
        }

        Ok(Some(likes))
    }

    /// Toggle `user_id` in the tweet's reposts
    pub async fn toggle_retweet(
        &self,
        tweet_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<(RetweetOutcome, Vec<Uuid>)>> {
        let Some(tweet) = self.find_by_id(tweet_id).await? else {
            return Ok(None);
        };

        let mut reposts = tweet.reposts;
        let outcome = if membership::insert_id(&mut reposts, user_id) {
            RetweetOutcome::Retweeted
        } else {
            membership::remove_id(&mut reposts, user_id);
            RetweetOutcome::Undone
        };
        self.set_reposts(tweet_id, &reposts).await?;

        Ok(Some((outcome, reposts)))
    }

    /// Create a reply to `parent_id` and append it to the parent's replies
    ///
    /// Returns `None` when the parent does not exist. Two-row write with no
    /// transaction, like the follow mutation.
    pub async fn reply(&self, parent_id: Uuid, author: Uuid, body: &str) -> Result<Option<Tweet>> {
        let Some(parent) = self.find_by_id(parent_id).await? else {
            return Ok(None);
        };

        let tweet = self.create(author, body, Some(parent_id)).await?;

        let mut replies = parent.replies;
        replies.push(tweet.id);
        self.set_replies(parent_id, &replies).await?;

        Ok(Some(tweet))
    }

    async fn set_likes(&self, id: Uuid, likes: &[Uuid]) -> Result<()> {
        sqlx::query("UPDATE tweets SET likes = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(likes)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_reposts(&self, id: Uuid, reposts: &[Uuid]) -> Result<()> {
        sqlx::query("UPDATE tweets SET reposts = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(reposts)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_replies(&self, id: Uuid, replies: &[Uuid]) -> Result<()> {
        sqlx::query("UPDATE tweets SET replies = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(replies)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn tweet_from_row(row: &sqlx::postgres::PgRow) -> Tweet {
        Tweet {
            id: row.get("id"),
            body: row.get("body"),
            author: row.get("author"),
            likes: row.get("likes"),
            reposts: row.get("reposts"),
            parent: row.get("parent"),
            replies: row.get("replies"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}
