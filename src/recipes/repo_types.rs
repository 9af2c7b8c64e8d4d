use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Recipe record as stored. The owner is referenced by `user_id` only.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recipe {
    id: i64,
    title: String,
    instructions: String,
    minutes_to_complete: i32,
    user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl Recipe {
    pub(crate) fn from_draft(id: i64, draft: &RecipeDraft, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            instructions: draft.instructions.clone(),
            minutes_to_complete: draft.minutes_to_complete,
            user_id: draft.user_id,
            created_at,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn minutes_to_complete(&self) -> i32 {
        self.minutes_to_complete
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn set_minutes_to_complete(&mut self, minutes: i32) {
        self.minutes_to_complete = minutes;
    }

    pub(crate) fn replace_title(&mut self, title: String) {
        self.title = title;
    }

    pub(crate) fn replace_instructions(&mut self, instructions: String) {
        self.instructions = instructions;
    }

    pub(crate) fn replace_user_id(&mut self, user_id: i64) {
        self.user_id = user_id;
    }
}

/// A validated recipe waiting to be inserted.
#[derive(Debug)]
pub struct RecipeDraft {
    pub(crate) title: String,
    pub(crate) instructions: String,
    pub(crate) minutes_to_complete: i32,
    pub(crate) user_id: i64,
}

impl RecipeDraft {
    pub fn user_id(&self) -> i64 {
        self.user_id
    }
}
