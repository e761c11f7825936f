//! Membership primitives for id-list fields
//!
//! The follower/following lists on users and the likes/reposts lists on
//! tweets are sets of ids stored as arrays. Every mutation goes through
//! these two functions so each list keeps set semantics: `insert_id` never
//! duplicates, and `remove_id` removes exactly one matching element and
//! leaves the rest of the list intact.

use uuid::Uuid;

/// Append `id` unless it is already present. Returns whether the list changed.
pub fn insert_id(ids: &mut Vec<Uuid>, id: Uuid) -> bool {
    if ids.contains(&id) {
        return false;
    }
    ids.push(id);
    true
}

/// Remove exactly one element equal to `id`. Returns whether the list changed.
pub fn remove_id(ids: &mut Vec<Uuid>, id: Uuid) -> bool {
    match ids.iter().position(|x| *x == id) {
        Some(index) => {
            ids.remove(index);
            true
        }
        None => false,
    }
}
