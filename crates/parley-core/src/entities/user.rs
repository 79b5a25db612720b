//! User entity - represents an account in the user directory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// User entity
///
/// Credential material never appears here; authentication is the user
/// directory's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// URL into the external image store, if the user has a profile picture
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with required fields
    pub fn new(id: UserId, username: String) -> Self {
        Self {
            id,
            username,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a profile picture URL
    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}
