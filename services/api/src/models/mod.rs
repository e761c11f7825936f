//! API service models

pub mod tweet;
pub mod user;

// Re-export for convenience
pub use tweet::{Tweet, TweetAuthor, TweetView};
pub use user::{NewUser, PublicUser, User};
