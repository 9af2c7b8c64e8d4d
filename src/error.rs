use std::fmt;

use thiserror::Error;

/// A single violated record invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Username cannot be empty.")]
    EmptyUsername,
    #[error("Username must be unique.")]
    DuplicateUsername,
    #[error("Password cannot be empty.")]
    EmptyPassword,
    #[error("Password hash has not been set.")]
    PasswordNotSet,
    #[error("Title cannot be empty.")]
    EmptyTitle,
    #[error("Instructions must be at least {min} characters long (got {len}).")]
    InstructionsTooShort { len: usize, min: usize },
    #[error("Recipe must be associated with a user.")]
    MissingUser,
    #[error("Recipe references unknown user {0}.")]
    UnknownUser(i64),
}

impl ValidationError {
    /// Name of the record field the violation belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername | Self::DuplicateUsername => "username",
            Self::EmptyPassword | Self::PasswordNotSet => "password",
            Self::EmptyTitle => "title",
            Self::InstructionsTooShort { .. } => "instructions",
            Self::MissingUser | Self::UnknownUser(_) => "user_id",
        }
    }
}

/// Every violation found while validating one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn push(&mut self, err: ValidationError) {
        self.0.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, err: &ValidationError) -> bool {
        self.0.contains(err)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Moves the violations of `res` into `self`; any other error is returned.
    pub fn record(&mut self, res: Result<(), Error>) -> Result<(), Error> {
        match res {
            Ok(()) => Ok(()),
            Err(Error::Validation(errs)) => {
                self.0.extend(errs.0);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(err: ValidationError) -> Self {
        Self(vec![err])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err.into())
    }
}

impl Error {
    /// The violations carried by a validation failure, if that is what this is.
    pub fn violations(&self) -> Option<&ValidationErrors> {
        match self {
            Error::Validation(errs) => Some(errs),
            _ => None,
        }
    }

    /// True when this is a validation failure that includes `err`.
    pub fn is_violation(&self, err: &ValidationError) -> bool {
        self.violations().is_some_and(|errs| errs.contains(err))
    }
}
