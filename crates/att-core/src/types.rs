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

    /// Invalid UTC offset for the reference timezone.
    #[error("invalid UTC offset: {value} (expected e.g. +05:30)")]
    InvalidOffset { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated organization (tenant) identifier.
    OrgId, "organization ID"
);

define_string_id!(
    /// A validated service identity identifier.
    ///
    /// System identities are the only callers allowed to drive scans and
    /// actions, and each one is bound to exactly one organization.
    SystemId, "system ID"
);

define_string_id!(
    /// A validated staff member identifier.
    StaffId, "staff ID"
);

define_string_id!(
    /// A validated attendance session identifier.
    SessionId, "session ID"
);

define_string_id!(
    /// A validated attendance event identifier.
    EventId, "event ID"
);

/// How a scan identifies the employee.
///
/// Employee codes are preferred; email is the fallback when no code is given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmployeeIdentifier {
    Code(String),
    Email(String),
}

impl EmployeeIdentifier {
    /// Builds an identifier from optional code and email, preferring the code.
    ///
    /// Blank values are treated as absent. Returns `None` when neither is usable.
    #[must_use]
    pub fn from_parts(code: Option<&str>, email: Option<&str>) -> Option<Self> {
        let code = code.map(str::trim).filter(|c| !c.is_empty());
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        match (code, email) {
            (Some(code), _) => Some(Self::Code(code.to_string())),
            (None, Some(email)) => Some(Self::Email(email.to_lowercase())),
            (None, None) => None,
        }
    }

    /// The raw identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Code(value) | Self::Email(value) => value,
        }
    }
}

impl fmt::Display for EmployeeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "code {code}"),
            Self::Email(email) => write!(f, "email {email}"),
        }
    }
}
