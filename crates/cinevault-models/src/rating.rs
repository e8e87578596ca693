use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Personal score a viewer gives to a watched movie, always within 0..=10
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct UserRating(f64);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingError {
    #[error("rating must be a number, got {0:?}")]
    NotANumber(String),
    #[error("rating must be between {min} and {max}, got {value}", min = UserRating::MIN, max = UserRating::MAX)]
    OutOfRange { value: f64 },
}

impl UserRating {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 10.0;

    pub fn new(value: f64) -> Result<Self, RatingError> {
        if !value.is_finite() {
            return Err(RatingError::NotANumber(value.to_string()));
        }
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(RatingError::OutOfRange { value });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for UserRating {
    type Error = RatingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserRating> for f64 {
    fn from(rating: UserRating) -> Self {
        rating.0
    }
}

/// Parses user input such as `"8.5"` or `"8,5"`
impl FromStr for UserRating {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(',', ".");
        let value: f64 = normalized
            .parse()
            .map_err(|_| RatingError::NotANumber(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for UserRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_dot_and_comma_decimals() {
        assert_eq!("8.5".parse::<UserRating>().unwrap().value(), 8.5);
        assert_eq!("8,5".parse::<UserRating>().unwrap().value(), 8.5);
        assert_eq!(" 10 ".parse::<UserRating>().unwrap().value(), 10.0);
        assert_eq!("0".parse::<UserRating>().unwrap().value(), 0.0);
    }

    #[test]
    fn test_parse_rejects_out_of_range_and_garbage() {
        assert!(matches!("11".parse::<UserRating>(), Err(RatingError::OutOfRange { .. })));
        assert!(matches!("-1".parse::<UserRating>(), Err(RatingError::OutOfRange { .. })));
        assert!(matches!("abc".parse::<UserRating>(), Err(RatingError::NotANumber(_))));
        assert!("".parse::<UserRating>().is_err());
        assert!("NaN".parse::<UserRating>().is_err());
        assert!("inf".parse::<UserRating>().is_err());
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let rating = UserRating::new(7.5).unwrap();
        assert_eq!(serde_json::to_string(&rating).unwrap(), "7.5");
        assert!(serde_json::from_str::<UserRating>("10.5").is_err());
        assert_eq!(serde_json::from_str::<UserRating>("3").unwrap().value(), 3.0);
    }
}
