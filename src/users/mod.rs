mod dto;
pub mod password;
mod repo_types;
pub mod services;

pub use dto::{NewUser, UserDetails};
pub(crate) use dto::null_as_empty;
pub use repo_types::{User, UserDraft};
pub use services::{validate_password, validate_username};
