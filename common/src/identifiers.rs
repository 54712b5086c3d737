use std::fmt;

use serde::{Deserialize, Serialize};

pub const MAX_USERNAME_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsernameError {
    Empty,
    TooLong { max: usize },
}

impl fmt::Display for UsernameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsernameError::Empty => write!(f, "Username must not be empty"),
            UsernameError::TooLong { max } => {
                write!(f, "Username must be at most {} characters", max)
            }
        }
    }
}

impl std::error::Error for UsernameError {}

/// Leaderboard name. Always stored trimmed; comparison is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> Result<Self, UsernameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UsernameError::Empty);
        }
        if trimmed.chars().count() > MAX_USERNAME_LENGTH {
            return Err(UsernameError::TooLong {
                max: MAX_USERNAME_LENGTH,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wraps a name read back from the score store. Limits apply when a name
    /// is saved, not when existing rows are read.
    pub fn from_stored(name: String) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Username> for String {
    fn from(name: Username) -> Self {
        name.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_is_trimmed() {
        let name = Username::parse("  Alice \t").unwrap();
        assert_eq!(name.as_str(), "Alice");
    }

    #[test]
    fn test_username_rejects_blank() {
        assert_eq!(Username::parse(""), Err(UsernameError::Empty));
        assert_eq!(Username::parse("   "), Err(UsernameError::Empty));
    }

    #[test]
    fn test_username_rejects_too_long() {
        let raw = "x".repeat(MAX_USERNAME_LENGTH + 1);
        assert_eq!(
            Username::parse(&raw),
            Err(UsernameError::TooLong { max: MAX_USERNAME_LENGTH })
        );
        assert!(Username::parse(&"x".repeat(MAX_USERNAME_LENGTH)).is_ok());
    }

    #[test]
    fn test_stored_username_skips_length_limit() {
        let raw = "y".repeat(MAX_USERNAME_LENGTH + 8);
        assert_eq!(Username::from_stored(raw.clone()).as_str(), raw);
    }

    #[test]
    fn test_username_is_case_sensitive() {
        assert_ne!(Username::parse("alice").unwrap(), Username::parse("Alice").unwrap());
    }
}
