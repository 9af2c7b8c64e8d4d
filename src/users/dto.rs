use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::recipes::Recipe;
use crate::users::User;

/// Input for `User::create`.
#[derive(Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(default)]
    pub password: Option<String>, // plaintext, hashed during create
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bio: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    pub fn bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("image_url", &self.image_url)
            .field("bio", &self.bio)
            .finish()
    }
}

/// Reads a missing or `null` string as `""`, so the field validators see
/// it and report the empty value.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A user together with the recipes it owns.
///
/// Recipes serialize with their `user_id` only, so the owner is not
/// expanded again inside each recipe.
#[derive(Debug, Serialize)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: User,
    pub recipes: Vec<Recipe>,
}
