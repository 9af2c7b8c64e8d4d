//! User accounts and recipes with field validation and password hashing,
//! backed by Postgres or an in-memory store.

pub mod config;
pub mod db;
pub mod error;
pub mod recipes;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod users;

pub use error::{Error, ValidationError, ValidationErrors};
pub use recipes::{NewRecipe, Recipe, RecipeDetails};
pub use state::AppState;
pub use store::{MemoryStore, Store};
pub use users::{NewUser, User, UserDetails};
