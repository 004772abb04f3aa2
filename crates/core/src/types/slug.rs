//! URL-safe slugs for brand pages.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_-]+").expect("slug pattern is valid"));

/// Errors that can occur when building a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// Nothing usable remained after normalisation.
    #[error("slug cannot be empty")]
    Empty,
    /// The input contains characters that are not URL-safe.
    #[error("slug may only contain a-z, 0-9, '-' and '_' (got {0:?})")]
    InvalidCharacters(String),
}

/// A URL-safe identifier (`[a-z0-9_-]+`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate an explicit slug.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError`] if the input is empty or not URL-safe.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if NON_SLUG_CHARS.is_match(s) {
            return Err(SlugError::InvalidCharacters(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a display name: lowercase, whitespace runs become
    /// `-`, every other character outside `[a-z0-9_-]` is dropped.
    ///
    /// ```
    /// use atelier_core::Slug;
    ///
    /// assert_eq!(Slug::derive("Zara Home").unwrap().as_str(), "zara-home");
    /// assert_eq!(Slug::derive("Marks & Spencer").unwrap().as_str(), "marks--spencer");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if the name has no slug characters.
    pub fn derive(name: &str) -> Result<Self, SlugError> {
        let lowered = name.trim().to_lowercase();
        let hyphenated = WHITESPACE.replace_all(&lowered, "-");
        let cleaned = NON_SLUG_CHARS.replace_all(&hyphenated, "");
        if cleaned.is_empty() {
            return Err(SlugError::Empty);
        }
        Ok(Self(cleaned.into_owned()))
    }

    /// The slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}
