use cinevault_models::{RatingError, UserRating};
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Input rejected before any side effect
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0:?} is not a valid email address")]
    InvalidEmail(String),

    #[error("password must be at least {min} characters", min = MIN_PASSWORD_LEN)]
    PasswordTooShort,

    #[error("invalid rating: {0}")]
    InvalidRating(#[from] RatingError),

    #[error("search query cannot be empty")]
    EmptyQuery,
}

/// `local@domain.tld` with no whitespace; deliberately loose beyond that
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail(email.to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (name, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if name.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// User-typed rating such as `7.5` or `7,5`
pub fn parse_rating(input: &str) -> Result<UserRating, ValidationError> {
    Ok(input.parse::<UserRating>()?)
}

pub fn validate_query(query: &str) -> Result<&str, ValidationError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(trimmed)
}
