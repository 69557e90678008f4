//! ID types for Sleeper entities.
//!
//! Sleeper serves every identifier as a JSON string, so these wrap `String`
//! rather than an integer.

use crate::error::{LakeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn parse_id(kind: &str, s: &str) -> Result<String> {
    let s = s.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(LakeError::InvalidValue {
            message: format!("{kind} must be numeric, got {s:?}"),
        });
    }
    Ok(s.to_string())
}

/// Type-safe wrapper for Sleeper league ids.
///
/// # Examples
///
/// ```rust
/// use ffl_lake::LeagueId;
///
/// let league_id: LeagueId = "1048297430343655424".parse().unwrap();
/// assert_eq!(league_id.as_str(), "1048297430343655424");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeagueId(pub String);

impl LeagueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LeagueId {
    type Err = LakeError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(parse_id("league id", s)?))
    }
}

/// Type-safe wrapper for Sleeper user ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = LakeError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(parse_id("user id", s)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraftId(pub String);

impl DraftId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_id_parse() {
        let id: LeagueId = " 1048297430343655424 ".parse().unwrap();
        assert_eq!(id.to_string(), "1048297430343655424");
        assert!("abc".parse::<LeagueId>().is_err());
        assert!("".parse::<UserId>().is_err());
    }
}
