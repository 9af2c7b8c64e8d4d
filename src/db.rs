use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::error::{Error, ValidationError};
use crate::recipes::{Recipe, RecipeDraft};
use crate::store::Store;
use crate::users::{User, UserDraft};

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Constraint names Postgres assigns to the inline constraints in `migrations/`.
const USERNAME_UNIQUE: &str = "users_username_key";
const RECIPE_OWNER_FK: &str = "recipes_user_id_fkey";

/// Turns violations of the username and owner constraints into the matching
/// validation errors. `user_id` is the owner the failed write referenced.
fn write_error(e: sqlx::Error, user_id: Option<i64>) -> Error {
    if let sqlx::Error::Database(db) = &e {
        match (db.constraint(), user_id) {
            (Some(USERNAME_UNIQUE), _) if db.is_unique_violation() => {
                return ValidationError::DuplicateUsername.into();
            }
            (Some(RECIPE_OWNER_FK), Some(id)) if db.is_foreign_key_violation() => {
                return ValidationError::UnknownUser(id).into();
            }
            _ => {}
        }
    }
    Error::Database(e)
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert_user(&self, draft: &UserDraft) -> Result<User, Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, image_url, bio)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, image_url, bio, created_at
            "#,
        )
        .bind(&draft.username)
        .bind(&draft.password_hash)
        .bind(&draft.image_url)
        .bind(&draft.bio)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, None))
    }

    async fn update_user(&self, user: &User) -> Result<(), Error> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET username = $2, password_hash = $3, image_url = $4, bio = $5
             WHERE id = $1
            "#,
        )
        .bind(user.id())
        .bind(user.username())
        .bind(user.stored_hash())
        .bind(user.image_url())
        .bind(user.bio())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, None))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound {
                entity: "user",
                id: user.id(),
            });
        }
        Ok(())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, image_url, bio, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, image_url, bio, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, Error> {
        // recipes go with it through ON DELETE CASCADE
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_recipe(&self, draft: &RecipeDraft) -> Result<Recipe, Error> {
        sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (title, instructions, minutes_to_complete, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, instructions, minutes_to_complete, user_id, created_at
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.instructions)
        .bind(draft.minutes_to_complete)
        .bind(draft.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, Some(draft.user_id)))
    }

    async fn update_recipe(&self, recipe: &Recipe) -> Result<(), Error> {
        let res = sqlx::query(
            r#"
            UPDATE recipes
               SET title = $2, instructions = $3, minutes_to_complete = $4, user_id = $5
             WHERE id = $1
            "#,
        )
        .bind(recipe.id())
        .bind(recipe.title())
        .bind(recipe.instructions())
        .bind(recipe.minutes_to_complete())
        .bind(recipe.user_id())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, Some(recipe.user_id())))?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound {
                entity: "recipe",
                id: recipe.id(),
            });
        }
        Ok(())
    }

    async fn find_recipe(&self, id: i64) -> Result<Option<Recipe>, Error> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, title, instructions, minutes_to_complete, user_id, created_at
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(recipe)
    }

    async fn list_recipes_by_user(&self, user_id: i64) -> Result<Vec<Recipe>, Error> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, title, instructions, minutes_to_complete, user_id, created_at
            FROM recipes
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_recipe(&self, id: i64) -> Result<bool, Error> {
        let res = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
