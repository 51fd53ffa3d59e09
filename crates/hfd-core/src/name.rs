//! # Application Names
//!
//! An application is identified by a case-sensitive name matching
//! `^[A-Za-z0-9_-]+$`. The name is interpolated into filesystem paths
//! (`<name>.html`, `<name>/index.html`), so [`AppName`] is the only way a
//! request-derived name reaches storage: construction validates, and every
//! store operation takes an `&AppName`.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Whether `name` is non-empty and composed only of ASCII letters, digits,
/// underscore and hyphen.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// A validated application name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppName(String);

impl AppName {
    /// Validate and wrap an application name.
    pub fn parse(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if is_valid_name(&name) {
            Ok(Self(name))
        } else {
            Err(ValidationError::InvalidName(name))
        }
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the single-file form, `<name>.html`.
    pub fn single_file_name(&self) -> String {
        format!("{}.html", self.0)
    }
}

impl TryFrom<String> for AppName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AppName> for String {
    fn from(name: AppName) -> Self {
        name.0
    }
}

impl AsRef<str> for AppName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AppName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for AppName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn matches_allow_list(s: &str) -> bool {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    proptest! {
        /// Every string drawn from the allow-listed alphabet is valid.
        #[test]
        fn allow_listed_strings_are_valid(name in "[A-Za-z0-9_-]{1,40}") {
            prop_assert!(is_valid_name(&name));
        }

        /// Validation agrees with the allow-list for arbitrary input.
        #[test]
        fn validation_matches_allow_list(name in "\\PC{0,24}") {
            prop_assert_eq!(is_valid_name(&name), matches_allow_list(&name));
        }
    }
}
