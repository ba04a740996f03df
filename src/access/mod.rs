//! Store access, one function per read or write the UI needs.
//!
//! Every function takes a borrowed connection and returns an
//! [`AccessResult`](crate::error::AccessResult); nothing is cached between calls.

pub mod catalog;
pub mod events;
pub mod lookups;
pub mod models;
pub mod presence;
pub mod rooms;
pub mod sessions;

use crate::error::{AccessError, AccessResult};

fn require_non_blank(field: &str, value: &str) -> AccessResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AccessError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}
