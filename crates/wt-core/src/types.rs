//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A duration that must be strictly positive was zero or negative.
    #[error("duration must be positive, got {value}ms")]
    NonPositiveDuration { value: i64 },

    /// The URL could not be parsed or carries no hostname.
    #[error("cannot extract hostname from {url:?}")]
    MalformedUrl { url: String },
}

/// A domain (URL hostname), the aggregation key for tracked time.
///
/// Domains must be non-empty. They are stored verbatim as store keys, so
/// `example.com` and `www.example.com` are tracked separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(String);

impl Domain {
    pub fn new(host: impl Into<String>) -> Result<Self, ValidationError> {
        let host = host.into();
        if host.is_empty() {
            return Err(ValidationError::Empty { field: "domain" });
        }
        Ok(Self(host))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Domain {
    type Error = ValidationError;

    fn try_from(host: String) -> Result<Self, Self::Error> {
        Self::new(host)
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Browser tab identifier as handed out by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A positive number of milliseconds to add to a domain's totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DeltaMs(i64);

impl DeltaMs {
    /// Creates a delta, rejecting zero and negative values.
    pub const fn new(value: i64) -> Result<Self, ValidationError> {
        if value <= 0 {
            return Err(ValidationError::NonPositiveDuration { value });
        }
        Ok(Self(value))
    }

    /// Returns the inner millisecond count.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_rejects_empty() {
        assert_eq!(
            Domain::new(""),
            Err(ValidationError::Empty { field: "domain" })
        );
    }

    #[test]
    fn domain_roundtrips_through_serde() {
        let domain = Domain::new("example.com").unwrap();
        let json = serde_json::to_string(&domain).unwrap();
        assert_eq!(json, r#""example.com""#);
        let parsed: Domain = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, domain);
    }

    #[test]
    fn domain_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<Domain>(r#""""#).is_err());
    }

    #[test]
    fn delta_rejects_zero_and_negative() {
        assert_eq!(
            DeltaMs::new(0),
            Err(ValidationError::NonPositiveDuration { value: 0 })
        );
        assert!(DeltaMs::new(-5).is_err());
        assert_eq!(DeltaMs::new(1).unwrap().value(), 1);
    }
}
