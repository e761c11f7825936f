//! Repositories for database operations

pub mod tweet;
pub mod user;

pub use tweet::{RetweetOutcome, TweetRepository};
pub use user::{FollowOutcome, UnfollowOutcome, UserRepository};
