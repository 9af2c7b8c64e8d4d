use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::error::{Error, ValidationError};
use crate::recipes::{Recipe, RecipeDraft};
use crate::users::{User, UserDraft};

/// Persistence for users and recipes.
///
/// Implementations enforce the two storage constraints: usernames are
/// unique (`ValidationError::DuplicateUsername`) and `recipes.user_id`
/// references an existing user (`ValidationError::UnknownUser`). Deleting a
/// user deletes its recipes.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short name for logs.
    fn backend(&self) -> &'static str;

    async fn insert_user(&self, draft: &UserDraft) -> Result<User, Error>;
    async fn update_user(&self, user: &User) -> Result<(), Error>;
    async fn find_user(&self, id: i64) -> Result<Option<User>, Error>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, Error>;
    /// Returns `false` when no such user existed.
    async fn delete_user(&self, id: i64) -> Result<bool, Error>;

    async fn insert_recipe(&self, draft: &RecipeDraft) -> Result<Recipe, Error>;
    async fn update_recipe(&self, recipe: &Recipe) -> Result<(), Error>;
    async fn find_recipe(&self, id: i64) -> Result<Option<Recipe>, Error>;
    /// Recipes owned by `user_id`, ordered by id.
    async fn list_recipes_by_user(&self, user_id: i64) -> Result<Vec<Recipe>, Error>;
    async fn delete_recipe(&self, id: i64) -> Result<bool, Error>;
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    recipes: BTreeMap<i64, Recipe>,
    last_user_id: i64,
    last_recipe_id: i64,
}

impl Tables {
    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.username() == username && Some(u.id()) != except)
    }
}

/// Process-local store. Used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert_user(&self, draft: &UserDraft) -> Result<User, Error> {
        let mut t = self.tables.write().await;
        if t.username_taken(draft.username(), None) {
            return Err(ValidationError::DuplicateUsername.into());
        }
        t.last_user_id += 1;
        let user = User::from_draft(t.last_user_id, draft, OffsetDateTime::now_utc());
        t.users.insert(user.id(), user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> Result<(), Error> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user.id()) {
            return Err(Error::NotFound {
                entity: "user",
                id: user.id(),
            });
        }
        if t.username_taken(user.username(), Some(user.id())) {
            return Err(ValidationError::DuplicateUsername.into());
        }
        t.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, Error> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.username() == username).cloned())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, Error> {
        let mut t = self.tables.write().await;
        if t.users.remove(&id).is_none() {
            return Ok(false);
        }
        t.recipes.retain(|_, r| r.user_id() != id);
        Ok(true)
    }

    async fn insert_recipe(&self, draft: &RecipeDraft) -> Result<Recipe, Error> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&draft.user_id()) {
            return Err(ValidationError::UnknownUser(draft.user_id()).into());
        }
        t.last_recipe_id += 1;
        let recipe = Recipe::from_draft(t.last_recipe_id, draft, OffsetDateTime::now_utc());
        t.recipes.insert(recipe.id(), recipe.clone());
        Ok(recipe)
    }

    async fn update_recipe(&self, recipe: &Recipe) -> Result<(), Error> {
        let mut t = self.tables.write().await;
        if !t.recipes.contains_key(&recipe.id()) {
            return Err(Error::NotFound {
                entity: "recipe",
                id: recipe.id(),
            });
        }
        if !t.users.contains_key(&recipe.user_id()) {
            return Err(ValidationError::UnknownUser(recipe.user_id()).into());
        }
        t.recipes.insert(recipe.id(), recipe.clone());
        Ok(())
    }

    async fn find_recipe(&self, id: i64) -> Result<Option<Recipe>, Error> {
        Ok(self.tables.read().await.recipes.get(&id).cloned())
    }

    async fn list_recipes_by_user(&self, user_id: i64) -> Result<Vec<Recipe>, Error> {
        let t = self.tables.read().await;
        Ok(t.recipes
            .values()
            .filter(|r| r.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn delete_recipe(&self, id: i64) -> Result<bool, Error> {
        Ok(self.tables.write().await.recipes.remove(&id).is_some())
    }
}
