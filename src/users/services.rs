use tracing::{debug, info, instrument, warn};

use crate::error::{Error, ValidationError, ValidationErrors};
use crate::recipes::Recipe;
use crate::store::Store;
use crate::users::dto::{NewUser, UserDetails};
use crate::users::password::{hash_password, verify_password};
use crate::users::repo_types::{User, UserDraft};

/// Checks that `value` is non-empty and not taken by another user.
///
/// `current` is the id of the user being renamed; its own row does not
/// count as a conflict. The lookup and the later write are not atomic, so
/// the store's unique constraint has the final word.
pub async fn validate_username(
    store: &dyn Store,
    value: &str,
    current: Option<i64>,
) -> Result<(), Error> {
    if value.is_empty() {
        return Err(ValidationError::EmptyUsername.into());
    }
    if let Some(existing) = store.find_user_by_username(value).await? {
        if Some(existing.id()) != current {
            return Err(ValidationError::DuplicateUsername.into());
        }
    }
    Ok(())
}

pub fn validate_password(plain: &str) -> Result<(), ValidationError> {
    if plain.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    Ok(())
}

impl User {
    /// Validates every field of `new`, hashes the password if one was given
    /// and inserts the user. Nothing is written when any check fails.
    #[instrument(skip(store, new), fields(username = %new.username))]
    pub async fn create(store: &dyn Store, new: NewUser) -> Result<User, Error> {
        let mut errors = ValidationErrors::default();
        errors.record(validate_username(store, &new.username, None).await)?;
        if let Some(plain) = new.password.as_deref() {
            if let Err(e) = validate_password(plain) {
                errors.push(e);
            }
        }
        if let Err(errors) = errors.into_result() {
            warn!(%errors, "user rejected");
            return Err(errors.into());
        }

        let password_hash = new.password.as_deref().map(hash_password).transpose()?;
        let draft = UserDraft {
            username: new.username,
            password_hash,
            image_url: new.image_url,
            bio: new.bio,
        };
        let user = store.insert_user(&draft).await?;
        info!(user_id = user.id(), "user created");
        Ok(user)
    }

    pub async fn find(store: &dyn Store, id: i64) -> Result<Option<User>, Error> {
        store.find_user(id).await
    }

    pub async fn find_by_username(store: &dyn Store, username: &str) -> Result<Option<User>, Error> {
        store.find_user_by_username(username).await
    }

    /// Replaces the stored hash. The change is persisted by `save`.
    pub fn set_password(&mut self, plain: &str) -> Result<(), Error> {
        validate_password(plain)?;
        self.replace_hash(hash_password(plain)?);
        debug!(user_id = self.id(), "password updated");
        Ok(())
    }

    /// Returns whether `plain` matches the stored credential.
    pub fn verify_password(&self, plain: &str) -> Result<bool, Error> {
        let hash = self.stored_hash().ok_or(ValidationError::PasswordNotSet)?;
        verify_password(plain, hash)
    }

    /// Renames the user after re-running the username checks. On failure
    /// the current name is kept.
    #[instrument(skip(self, store, username), fields(user_id = self.id()))]
    pub async fn set_username(
        &mut self,
        store: &dyn Store,
        username: impl Into<String>,
    ) -> Result<(), Error> {
        let username = username.into();
        if let Err(e) = validate_username(store, &username, Some(self.id())).await {
            warn!(error = %e, "rename rejected");
            return Err(e);
        }
        self.replace_username(username);
        Ok(())
    }

    /// Writes the current field values back to the store.
    pub async fn save(&self, store: &dyn Store) -> Result<(), Error> {
        store.update_user(self).await
    }

    /// Deletes the user and, through the cascade, every recipe it owns.
    #[instrument(skip(self, store), fields(user_id = self.id()))]
    pub async fn delete(self, store: &dyn Store) -> Result<(), Error> {
        if !store.delete_user(self.id()).await? {
            return Err(Error::NotFound {
                entity: "user",
                id: self.id(),
            });
        }
        info!("user deleted");
        Ok(())
    }

    /// Recipes owned by this user, ordered by id.
    pub async fn recipes(&self, store: &dyn Store) -> Result<Vec<Recipe>, Error> {
        store.list_recipes_by_user(self.id()).await
    }

    pub async fn details(self, store: &dyn Store) -> Result<UserDetails, Error> {
        let recipes = self.recipes(store).await?;
        Ok(UserDetails {
            user: self,
            recipes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::NewRecipe;
    use crate::store::MemoryStore;

    const INSTRUCTIONS: &str =
        "Chop the onions, sweat them in butter, add stock and simmer for twenty minutes.";

    #[tokio::test]
    async fn create_with_fresh_username_succeeds() {
        let store = MemoryStore::new();
        let user = User::create(&store, NewUser::new("chef1")).await.unwrap();
        assert_eq!(user.username(), "chef1");
        assert_eq!(user.image_url(), "");
        assert_eq!(user.bio(), "");
        assert!(!user.has_password());
        assert!(User::find(&store, user.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        User::create(&store, NewUser::new("chef1")).await.unwrap();
        let err = User::create(&store, NewUser::new("chef1")).await.unwrap_err();
        assert!(err.is_violation(&ValidationError::DuplicateUsername));
    }

    #[tokio::test]
    async fn empty_username_is_rejected() {
        let store = MemoryStore::new();
        let err = User::create(&store, NewUser::new("")).await.unwrap_err();
        assert!(err.is_violation(&ValidationError::EmptyUsername));
        assert!(User::find_by_username(&store, "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn null_or_missing_username_reaches_the_validator() {
        let store = MemoryStore::new();
        for body in [r#"{"username":null}"#, r#"{"bio":null}"#] {
            let new: NewUser = serde_json::from_str(body).expect("input should deserialize");
            assert_eq!(new.username, "");
            let err = User::create(&store, new).await.unwrap_err();
            assert!(err.is_violation(&ValidationError::EmptyUsername));
        }
    }

    #[tokio::test]
    async fn empty_password_and_username_are_both_reported() {
        let store = MemoryStore::new();
        let err = User::create(&store, NewUser::new("").password(""))
            .await
            .unwrap_err();
        let violations = err.violations().expect("validation error");
        assert_eq!(violations.len(), 2);
        assert!(violations.contains(&ValidationError::EmptyUsername));
        assert!(violations.contains(&ValidationError::EmptyPassword));
    }

    #[tokio::test]
    async fn chef_password_scenario() {
        let store = MemoryStore::new();
        let user = User::create(&store, NewUser::new("chef1").password("secret123"))
            .await
            .unwrap();
        assert!(user.verify_password("secret123").unwrap());
        assert!(!user.verify_password("wrong").unwrap());

        let reloaded = User::find_by_username(&store, "chef1").await.unwrap().unwrap();
        assert!(reloaded.verify_password("secret123").unwrap());
    }

    #[tokio::test]
    async fn verify_without_hash_fails() {
        let store = MemoryStore::new();
        let user = User::create(&store, NewUser::new("nopass")).await.unwrap();
        let err = user.verify_password("anything").unwrap_err();
        assert!(err.is_violation(&ValidationError::PasswordNotSet));
    }

    #[tokio::test]
    async fn set_password_rejects_empty_and_keeps_state() {
        let store = MemoryStore::new();
        let mut user = User::create(&store, NewUser::new("cook")).await.unwrap();
        let err = user.set_password("").unwrap_err();
        assert!(err.is_violation(&ValidationError::EmptyPassword));
        assert!(!user.has_password());

        user.set_password("new-secret").unwrap();
        user.save(&store).await.unwrap();
        let reloaded = User::find(&store, user.id()).await.unwrap().unwrap();
        assert!(reloaded.verify_password("new-secret").unwrap());
    }

    #[tokio::test]
    async fn serialized_user_hides_hash_and_recipes_hide_owner() {
        let store = MemoryStore::new();
        let user = User::create(&store, NewUser::new("chef1").password("secret123"))
            .await
            .unwrap();
        Recipe::create(&store, NewRecipe::new("Soup", INSTRUCTIONS, user.id()))
            .await
            .unwrap();

        let debug = format!("{user:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("argon2"));

        let json = serde_json::to_value(user.details(&store).await.unwrap()).unwrap();
        assert_eq!(json["username"], "chef1");
        assert!(json.get("password_hash").is_none());
        let recipes = json["recipes"].as_array().unwrap();
        assert_eq!(recipes.len(), 1);
        assert!(recipes[0].get("user").is_none());
    }

    #[tokio::test]
    async fn rename_revalidates() {
        let store = MemoryStore::new();
        User::create(&store, NewUser::new("taken")).await.unwrap();
        let mut user = User::create(&store, NewUser::new("mine")).await.unwrap();

        let err = user.set_username(&store, "taken").await.unwrap_err();
        assert!(err.is_violation(&ValidationError::DuplicateUsername));
        assert_eq!(user.username(), "mine");

        let err = user.set_username(&store, "").await.unwrap_err();
        assert!(err.is_violation(&ValidationError::EmptyUsername));

        // keeping the current name is not a conflict
        user.set_username(&store, "mine").await.unwrap();
        user.set_username(&store, "renamed").await.unwrap();
        user.set_bio("Soups mostly.");
        user.save(&store).await.unwrap();

        let reloaded = User::find_by_username(&store, "renamed").await.unwrap().unwrap();
        assert_eq!(reloaded.bio(), "Soups mostly.");
        assert!(User::find_by_username(&store, "mine").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_cascades_to_recipes() {
        let store = MemoryStore::new();
        let owner = User::create(&store, NewUser::new("owner")).await.unwrap();
        let other = User::create(&store, NewUser::new("other")).await.unwrap();
        for title in ["Soup", "Stew"] {
            Recipe::create(&store, NewRecipe::new(title, INSTRUCTIONS, owner.id()))
                .await
                .unwrap();
        }
        let kept = Recipe::create(&store, NewRecipe::new("Salad", INSTRUCTIONS, other.id()))
            .await
            .unwrap();

        let owner_id = owner.id();
        assert_eq!(owner.recipes(&store).await.unwrap().len(), 2);
        owner.delete(&store).await.unwrap();

        assert!(User::find(&store, owner_id).await.unwrap().is_none());
        assert!(store.list_recipes_by_user(owner_id).await.unwrap().is_empty());
        assert!(Recipe::find(&store, kept.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_twice_reports_not_found() {
        let store = MemoryStore::new();
        let user = User::create(&store, NewUser::new("ghost")).await.unwrap();
        let copy = user.clone();
        user.delete(&store).await.unwrap();
        let err = copy.delete(&store).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "user", .. }));
    }
}
