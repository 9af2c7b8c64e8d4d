mod dto;
mod repo_types;
pub mod services;

pub use dto::{NewRecipe, RecipeDetails};
pub use repo_types::{Recipe, RecipeDraft};
pub use services::{
    validate_instructions_length, validate_title, validate_user_id, MIN_INSTRUCTIONS_LEN,
};
