//! User repository for database operations
//!
//! Owns the credential store access and the social graph mutations. The
//! follow/unfollow operations update two rows with no transaction; two
//! concurrent mutations of the same pair race and the last full-column
//! write wins. Each mutation is a single method here so a transactional
//! variant could replace it without touching callers.

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::identity::Identity;
use crate::membership;
use crate::models::{NewUser, User};

/// Outcome of a follow mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    AlreadyFollowing,
}

/// Outcome of an unfollow mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnfollowOutcome {
    Unfollowed,
    NotFollowing,
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with a freshly hashed password
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        info!("Creating new user: {}", new_user.username);

        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, followers, following, created_at, updated_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::user_from_row(&row))
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, followers, following, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::user_from_row))
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, followers, following, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::user_from_row))
    }

    /// Verify a user's password
    pub async fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        let result = argon2.verify_password(password.as_bytes(), &parsed_hash);

        Ok(result.is_ok())
    }

    /// Establish the symmetric follow relationship between the resolved
    /// follower and the followee looked up by id
    ///
    /// Returns `None` when the followee does not exist. Re-following is a
    /// no-op reported as `AlreadyFollowing`.
    pub async fn follow(
        &self,
        follower: &Identity,
        followee_id: Uuid,
    ) -> Result<Option<FollowOutcome>> {
        let Some(followee) = self.find_by_id(followee_id).await? else {
            return Ok(None);
        };

        let mut following = follower.following.clone();
        let mut followers = followee.followers;
        if !establish_link(follower.id, followee_id, &mut following, &mut followers) {
            return Ok(Some(FollowOutcome::AlreadyFollowing));
        }

        // Two independent row updates; the pair invariant is not enforced
        // atomically.
        self.set_following(follower.id, &following).await?;
        self.set_followers(followee_id, &followers).await?;

        info!("User {} now follows {}", follower.id, followee_id);
        Ok(Some(FollowOutcome::Followed))
    }

    /// Sever the follow relationship in both directions
    ///
    /// Returns `None` when the followee does not exist. Ids absent from
    /// either side are left alone.
    pub async fn unfollow(
        &self,
        follower: &Identity,
        followee_id: Uuid,
    ) -> Result<Option<UnfollowOutcome>> {
        let Some(followee) = self.find_by_id(followee_id).await? else {
            return Ok(None);
        };

        let mut following = follower.following.clone();
        let mut followers = followee.followers;
        if !sever_link(follower.id, followee_id, &mut following, &mut followers) {
            return Ok(Some(UnfollowOutcome::NotFollowing));
        }

        self.set_following(follower.id, &following).await?;
        self.set_followers(followee_id, &followers).await?;

        info!("User {} no longer follows {}", follower.id, followee_id);
        Ok(Some(UnfollowOutcome::Unfollowed))
    }

    async fn set_following(&self, id: Uuid, following: &[Uuid]) -> Result<()> {
        sqlx::query("UPDATE users SET following = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(following)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_followers(&self, id: Uuid, followers: &[Uuid]) -> Result<()> {
        sqlx::query("UPDATE users SET followers = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(followers)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn user_from_row(row: &sqlx::postgres::PgRow) -> User {
        User {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            followers: row.get("followers"),
            following: row.get("following"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

/// Add the relationship to both id-lists unless either side already has it
fn establish_link(
    follower_id: Uuid,
    followee_id: Uuid,
    following: &mut Vec<Uuid>,
    followers: &mut Vec<Uuid>,
) -> bool {
    if following.contains(&followee_id) || followers.contains(&follower_id) {
        return false;
    }
    membership::insert_id(following, followee_id);
    membership::insert_id(followers, follower_id);
    true
}

/// Remove the relationship from both id-lists
fn sever_link(
    follower_id: Uuid,
    followee_id: Uuid,
    following: &mut Vec<Uuid>,
    followers: &mut Vec<Uuid>,
) -> bool {
    let was_following = membership::remove_id(following, followee_id);
    let was_follower = membership::remove_id(followers, follower_id);
    was_following || was_follower
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_is_idempotent_and_symmetric() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut alice_following = Vec::new();
        let mut bob_followers = Vec::new();

        assert!(establish_link(
            alice,
            bob,
            &mut alice_following,
            &mut bob_followers
        ));
        assert!(!establish_link(
            alice,
            bob,
            &mut alice_following,
            &mut bob_followers
        ));

        assert_eq!(alice_following, vec![bob]);
        assert_eq!(bob_followers, vec![alice]);
    }

    #[test]
    fn test_half_established_link_is_not_duplicated() {
        // If either side already reflects the relationship, nothing moves.
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut alice_following = Vec::new();
        let mut bob_followers = vec![alice];

        assert!(!establish_link(
            alice,
            bob,
            &mut alice_following,
            &mut bob_followers
        ));
        assert!(alice_following.is_empty());
        assert_eq!(bob_followers, vec![alice]);
    }

    #[test]
    fn test_sever_link_removes_both_directions() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let carol = Uuid::new_v4();
        let mut alice_following = vec![bob, carol];
        let mut bob_followers = vec![alice, carol];

        assert!(sever_link(
            alice,
            bob,
            &mut alice_following,
            &mut bob_followers
        ));
        assert_eq!(alice_following, vec![carol]);
        assert_eq!(bob_followers, vec![carol]);
    }

    #[test]
    fn test_sever_absent_link_is_noop() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut alice_following = Vec::new();
        let mut bob_followers = Vec::new();

        assert!(!sever_link(
            alice,
            bob,
            &mut alice_following,
            &mut bob_followers
        ));
    }
}
