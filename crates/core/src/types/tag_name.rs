//! Tag name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`TagName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TagNameError {
    /// The name is empty after trimming.
    #[error("tag name cannot be empty")]
    Empty,
    /// The name is longer than the allowed maximum.
    #[error("tag name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length in characters.
        max: usize,
    },
}

/// A tag label such as `rust` or `sql-snippets`.
///
/// Names are trimmed but otherwise kept verbatim: matching is exact and
/// case-sensitive, so `Rust` and `rust` are different tags.
///
/// ```
/// use reusify_core::TagName;
///
/// let name = TagName::parse("  demo ").unwrap();
/// assert_eq!(name.as_str(), "demo");
/// assert!(TagName::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    /// Maximum length of a tag name, in characters.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a tag name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TagNameError::Empty`] for blank input and
    /// [`TagNameError::TooLong`] when the trimmed name exceeds
    /// [`TagName::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, TagNameError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TagNameError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(TagNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parse a list of names, dropping repeats while keeping first-seen order.
    ///
    /// # Errors
    ///
    /// Returns the error of the first name that fails to parse.
    pub fn parse_list<I, S>(names: I) -> Result<Vec<Self>, TagNameError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed: Vec<Self> = Vec::new();
        for name in names {
            let tag = Self::parse(name.as_ref())?;
            if !parsed.contains(&tag) {
                parsed.push(tag);
            }
        }
        Ok(parsed)
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `TagName` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TagName {
    type Err = TagNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TagName {
    type Error = TagNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TagName> for String {
    fn from(name: TagName) -> Self {
        name.0
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        assert_eq!(TagName::parse("\tdemo  ").unwrap().as_str(), "demo");
    }

    #[test]
    fn test_parse_keeps_case() {
        let upper = TagName::parse("Rust").unwrap();
        let lower = TagName::parse("rust").unwrap();
        assert_ne!(upper, lower);
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(TagName::parse(""), Err(TagNameError::Empty));
        assert_eq!(TagName::parse("  \n"), Err(TagNameError::Empty));
    }

    #[test]
    fn test_parse_length_limit_counts_chars() {
        let at_limit = "é".repeat(TagName::MAX_LENGTH);
        assert!(TagName::parse(&at_limit).is_ok());

        let over = "x".repeat(TagName::MAX_LENGTH + 1);
        assert!(matches!(
            TagName::parse(&over),
            Err(TagNameError::TooLong { max: 64 })
        ));
    }

    #[test]
    fn test_parse_list_dedupes_in_order() {
        let names = TagName::parse_list(["demo", "new", " demo", "api"]).unwrap();
        let names: Vec<&str> = names.iter().map(TagName::as_str).collect();
        assert_eq!(names, vec!["demo", "new", "api"]);
    }

    #[test]
    fn test_parse_list_fails_on_blank_entry() {
        assert_eq!(
            TagName::parse_list(["ok", " "]),
            Err(TagNameError::Empty)
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let parsed: TagName = serde_json::from_str("\" sql \"").unwrap();
        assert_eq!(parsed.as_str(), "sql");
        assert!(serde_json::from_str::<TagName>("\"\"").is_err());
    }
}
