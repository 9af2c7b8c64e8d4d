use serde::{Deserialize, Serialize};

use crate::recipes::Recipe;
use crate::users::{null_as_empty, User};

/// Input for `Recipe::create`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRecipe {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub instructions: String,
    #[serde(default)]
    pub minutes_to_complete: i32,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl NewRecipe {
    pub fn new(title: impl Into<String>, instructions: impl Into<String>, user_id: i64) -> Self {
        Self {
            title: title.into(),
            instructions: instructions.into(),
            minutes_to_complete: 0,
            user_id: Some(user_id),
        }
    }

    pub fn minutes_to_complete(mut self, minutes: i32) -> Self {
        self.minutes_to_complete = minutes;
        self
    }
}

/// A recipe with its owner resolved. `User` carries no recipe list, so the
/// owner's collection is not expanded here.
#[derive(Debug, Serialize)]
pub struct RecipeDetails {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub user: User,
}
