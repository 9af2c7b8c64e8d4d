use tracing::{info, instrument, warn};

use crate::error::{Error, ValidationError, ValidationErrors};
use crate::recipes::dto::{NewRecipe, RecipeDetails};
use crate::recipes::repo_types::{Recipe, RecipeDraft};
use crate::store::Store;
use crate::users::User;

/// Shortest accepted instructions, in characters.
pub const MIN_INSTRUCTIONS_LEN: usize = 50;

pub fn validate_title(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

pub fn validate_instructions_length(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < MIN_INSTRUCTIONS_LEN {
        return Err(ValidationError::InstructionsTooShort {
            len,
            min: MIN_INSTRUCTIONS_LEN,
        });
    }
    Ok(())
}

/// Rejects a missing or zero owner id. Whether the user exists is left to
/// the store's foreign key.
pub fn validate_user_id(value: Option<i64>) -> Result<i64, ValidationError> {
    match value {
        Some(id) if id != 0 => Ok(id),
        _ => Err(ValidationError::MissingUser),
    }
}

impl Recipe {
    /// Runs every field check on `new` and inserts the recipe when all pass.
    #[instrument(skip(store, new), fields(title = %new.title, user_id = ?new.user_id))]
    pub async fn create(store: &dyn Store, new: NewRecipe) -> Result<Recipe, Error> {
        let mut errors = ValidationErrors::default();
        if let Err(e) = validate_title(&new.title) {
            errors.push(e);
        }
        if let Err(e) = validate_instructions_length(&new.instructions) {
            errors.push(e);
        }
        let user_id = validate_user_id(new.user_id).unwrap_or_else(|e| {
            errors.push(e);
            0
        });
        if let Err(errors) = errors.into_result() {
            warn!(%errors, "recipe rejected");
            return Err(errors.into());
        }

        let draft = RecipeDraft {
            title: new.title,
            instructions: new.instructions,
            minutes_to_complete: new.minutes_to_complete,
            user_id,
        };
        let recipe = store.insert_recipe(&draft).await?;
        info!(recipe_id = recipe.id(), "recipe created");
        Ok(recipe)
    }

    pub async fn find(store: &dyn Store, id: i64) -> Result<Option<Recipe>, Error> {
        store.find_recipe(id).await
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), ValidationError> {
        let title = title.into();
        validate_title(&title)?;
        self.replace_title(title);
        Ok(())
    }

    pub fn set_instructions(&mut self, instructions: impl Into<String>) -> Result<(), ValidationError> {
        let instructions = instructions.into();
        validate_instructions_length(&instructions)?;
        self.replace_instructions(instructions);
        Ok(())
    }

    /// Moves the recipe to another owner. Existence is checked on `save`.
    pub fn set_user_id(&mut self, user_id: i64) -> Result<(), ValidationError> {
        let user_id = validate_user_id(Some(user_id))?;
        self.replace_user_id(user_id);
        Ok(())
    }

    pub async fn save(&self, store: &dyn Store) -> Result<(), Error> {
        store.update_recipe(self).await
    }

    #[instrument(skip(self, store), fields(recipe_id = self.id()))]
    pub async fn delete(self, store: &dyn Store) -> Result<(), Error> {
        if !store.delete_recipe(self.id()).await? {
            return Err(Error::NotFound {
                entity: "recipe",
                id: self.id(),
            });
        }
        info!("recipe deleted");
        Ok(())
    }

    /// Looks up the owning user by `user_id`.
    pub async fn owner(&self, store: &dyn Store) -> Result<Option<User>, Error> {
        store.find_user(self.user_id()).await
    }

    pub async fn details(self, store: &dyn Store) -> Result<RecipeDetails, Error> {
        let user = self.owner(store).await?.ok_or(Error::NotFound {
            entity: "user",
            id: self.user_id(),
        })?;
        Ok(RecipeDetails { recipe: self, user })
    }
}
