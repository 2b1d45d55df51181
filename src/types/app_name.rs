// ABOUTME: Compose project name validation.
// ABOUTME: Ensures app names are accepted by `docker compose -p`.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

const MAX_LEN: usize = 63;
const SUFFIX_LEN: usize = 6;
const SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppNameError {
    #[error("app name cannot be empty")]
    Empty,

    #[error("app name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("app name must start with a lowercase letter or digit")]
    InvalidStart,

    #[error("app name must be lowercase")]
    NotLowercase,

    #[error("invalid character in app name: '{0}'")]
    InvalidChar(char),
}

/// Name used as the compose project (`-p`) and as the directory for files and logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppName(String);

impl AppName {
    pub fn new(value: &str) -> Result<Self, AppNameError> {
        if value.is_empty() {
            return Err(AppNameError::Empty);
        }

        if value.len() > MAX_LEN {
            return Err(AppNameError::TooLong);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(AppNameError::NotLowercase);
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '_' {
                return Err(AppNameError::InvalidChar(c));
            }
        }

        if value.starts_with(['-', '_']) {
            return Err(AppNameError::InvalidStart);
        }

        Ok(Self(value.to_string()))
    }

    /// Derive an app name from a display name, e.g. "My Shop" -> "my-shop-x7k2qa".
    pub fn derive(display_name: &str) -> Self {
        let mut slug = String::new();
        for c in display_name.trim().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let slug = slug.trim_end_matches('-');
        let slug = if slug.is_empty() { "app" } else { slug };
        let slug = &slug[..slug.len().min(MAX_LEN - SUFFIX_LEN - 1)];

        Self(format!(
            "{}-{}",
            slug.trim_end_matches('-'),
            random_suffix(SUFFIX_LEN)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Random lowercase alphanumeric suffix, usable inside app and service names.
pub(crate) fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| SUFFIX_CHARS[rng.gen_range(0..SUFFIX_CHARS.len())] as char)
        .collect()
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for AppName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AppName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AppName::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slugifies_and_suffixes() {
        let name = AppName::derive("My Shop!");
        assert!(name.as_str().starts_with("my-shop-"));
        assert_eq!(name.as_str().len(), "my-shop-".len() + SUFFIX_LEN);
        assert!(AppName::new(name.as_str()).is_ok());
    }

    #[test]
    fn derive_falls_back_for_symbol_only_names() {
        let name = AppName::derive("***");
        assert!(name.as_str().starts_with("app-"));
    }

    #[test]
    fn derive_respects_max_length() {
        let name = AppName::derive(&"x".repeat(200));
        assert!(name.as_str().len() <= MAX_LEN);
        assert!(AppName::new(name.as_str()).is_ok());
    }
}
