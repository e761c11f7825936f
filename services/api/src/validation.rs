//! Input validation utilities
//!
//! Validators return a human-readable reason on failure; handlers collect
//! them into a field-keyed map and reject with an unprocessable-entity
//! status before any business logic runs.

use regex::Regex;
use std::sync::OnceLock;

/// Maximum username length in characters
pub const MAX_USERNAME_LEN: usize = 15;

/// Maximum tweet body length in characters
pub const MAX_TWEET_LEN: usize = 140;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required in the request body".to_string());
    }

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(format!(
            "Username limited to a max of {} characters",
            MAX_USERNAME_LEN
        ));
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required in the request body".to_string());
    }

    Ok(())
}

/// Validate tweet body
pub fn validate_tweet_body(body: &str) -> Result<(), String> {
    if body.is_empty() {
        return Err("Tweet body is required in the request body".to_string());
    }

    if body.chars().count() > MAX_TWEET_LEN {
        return Err(format!(
            "Tweet body limited to a max of {} characters",
            MAX_TWEET_LEN
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_boundary() {
        assert!(validate_username(&"a".repeat(15)).is_ok());
        assert!(validate_username(&"a".repeat(16)).is_err());
    }

    #[test]
    fn test_username_required() {
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_username_charset() {
        assert!(validate_username("alice_99").is_ok());
        assert!(validate_username("alice bob").is_err());
    }

    #[test]
    fn test_password_required() {
        assert!(validate_password("").is_err());
        assert!(validate_password("secret123").is_ok());
    }

    #[test]
    fn test_tweet_body_boundary() {
        assert!(validate_tweet_body(&"x".repeat(140)).is_ok());
        assert!(validate_tweet_body(&"x".repeat(141)).is_err());
    }

    #[test]
    fn test_tweet_body_required() {
        assert!(validate_tweet_body("").is_err());
    }
}
