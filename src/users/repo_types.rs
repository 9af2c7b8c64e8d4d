use std::fmt;

use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record as stored.
///
/// Fields are private: `username` only changes through the validated
/// setter, and the password hash has no read accessor at all.
#[derive(Clone, Serialize, FromRow)]
pub struct User {
    id: i64,
    username: String,
    #[serde(skip_serializing)]
    password_hash: Option<String>, // Argon2 PHC string, never exposed
    image_url: String,
    bio: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl User {
    pub(crate) fn from_draft(id: i64, draft: &UserDraft, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            username: draft.username.clone(),
            password_hash: draft.password_hash.clone(),
            image_url: draft.image_url.clone(),
            bio: draft.bio.clone(),
            created_at,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn bio(&self) -> &str {
        &self.bio
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Whether a credential has been set.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn set_image_url(&mut self, image_url: impl Into<String>) {
        self.image_url = image_url.into();
    }

    pub fn set_bio(&mut self, bio: impl Into<String>) {
        self.bio = bio.into();
    }

    pub(crate) fn stored_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub(crate) fn replace_hash(&mut self, hash: String) {
        self.password_hash = Some(hash);
    }

    pub(crate) fn replace_username(&mut self, username: String) {
        self.username = username;
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "<redacted>"))
            .field("image_url", &self.image_url)
            .field("bio", &self.bio)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A validated user waiting to be inserted.
pub struct UserDraft {
    pub(crate) username: String,
    pub(crate) password_hash: Option<String>,
    pub(crate) image_url: String,
    pub(crate) bio: String,
}

impl UserDraft {
    pub fn username(&self) -> &str {
        &self.username
    }
}
