//! Identity resolution from access tokens
//!
//! Every authorized operation turns its bearer token back into a stored
//! user through this resolver: verify the signature and expiry, decode the
//! embedded username, and read the user record. One credential store read
//! per call, no caching. The username inside a verified token is trusted
//! as-is; with no server-side revocation list, expiry is the only thing
//! that can invalidate it.

use thiserror::Error;
use uuid::Uuid;

use crate::jwt::{JwtService, TokenError};
use crate::repositories::UserRepository;

/// Minimal view of the user a token resolves to
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
}

/// Why a token failed to resolve
///
/// A failed lookup is an error, never an anonymous identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("user no longer exists")]
    UnknownUser,

    #[error("credential store lookup failed: {0}")]
    Store(anyhow::Error),
}

/// Resolves bearer tokens to user identities
#[derive(Clone)]
pub struct IdentityResolver {
    jwt: JwtService,
    users: UserRepository,
}

impl IdentityResolver {
    /// Create a new identity resolver
    pub fn new(jwt: JwtService, users: UserRepository) -> Self {
        Self { jwt, users }
    }

    /// Resolve a bearer token to the identity it was issued for
    pub async fn resolve(&self, token: &str) -> Result<Identity, IdentityError> {
        let claims = self.jwt.validate_token(token)?;

        let user = self
            .users
            .find_by_username(&claims.sub)
            .await
            .map_err(IdentityError::Store)?
            .ok_or(IdentityError::UnknownUser)?;

        Ok(Identity {
            id: user.id,
            username: user.username,
            followers: user.followers,
            following: user.following,
        })
    }
}
