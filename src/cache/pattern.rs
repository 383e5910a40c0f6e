//! Key Pattern Module
//!
//! Matching rules for `keys` listings and `invalidate` calls.

use regex::Regex;
use serde::Deserialize;

use crate::error::{CacheError, Result};

const GLOB_METACHARACTERS: [char; 4] = ['*', '?', '[', ']'];

// == Key Pattern ==
/// A compiled key matcher.
#[derive(Debug, Clone)]
pub enum KeyPattern {
    /// Matches every key
    Any,
    /// Matches keys starting with the prefix
    Prefix(String),
    /// Matches keys accepted by the regular expression
    Regex(Regex),
}

impl KeyPattern {
    // == Invalidation Patterns ==
    /// Compiles an invalidation pattern.
    ///
    /// `"foo/*"` (a literal prefix and a single trailing wildcard) is a prefix
    /// scan; anything else, `"^foo/.*"` included, is a regular expression
    /// searched for within each key.
    pub fn for_invalidation(pattern: &str) -> Result<Self> {
        if let Some(prefix) = pattern.strip_suffix('*') {
            if regex::escape(prefix) == prefix {
                return Ok(KeyPattern::Prefix(prefix.to_string()));
            }
        }
        Regex::new(pattern)
            .map(KeyPattern::Regex)
            .map_err(|err| CacheError::InvalidPattern(format!("{}: {}", pattern, err)))
    }

    // == Glob Patterns ==
    /// Compiles a glob used to list keys.
    ///
    /// `*` matches any run of characters and `?` a single character; all
    /// other characters match literally and the whole key must match.
    pub fn from_glob(pattern: &str) -> Result<Self> {
        if let Some(prefix) = trailing_wildcard_prefix(pattern) {
            return Ok(KeyPattern::Prefix(prefix.to_string()));
        }

        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');
        for ch in pattern.chars() {
            match ch {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                other => expr.push_str(&regex::escape(&other.to_string())),
            }
        }
        expr.push('$');

        Regex::new(&expr)
            .map(KeyPattern::Regex)
            .map_err(|err| CacheError::InvalidPattern(format!("{}: {}", pattern, err)))
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::Any => true,
            KeyPattern::Prefix(prefix) => key.starts_with(prefix.as_str()),
            KeyPattern::Regex(regex) => regex.is_match(key),
        }
    }
}

/// Returns the prefix of `pattern` if its only glob metacharacter is a
/// trailing `*`.
fn trailing_wildcard_prefix(pattern: &str) -> Option<&str> {
    let prefix = pattern.strip_suffix('*')?;
    if prefix.contains(&GLOB_METACHARACTERS[..]) {
        None
    } else {
        Some(prefix)
    }
}

// == Invalidation Rule ==
/// Structured invalidation request combining a key pattern with tags.
///
/// An entry matches when its key matches `key_pattern` (if given) and it
/// carries at least one of `tags` (if any are given). A rule with neither
/// matches nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidationRule {
    #[serde(default)]
    pub key_pattern: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl InvalidationRule {
    pub fn for_pattern(pattern: impl Into<String>) -> Self {
        Self {
            key_pattern: Some(pattern.into()),
            tags: Vec::new(),
        }
    }

    pub fn for_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_pattern: None,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.key_pattern.is_none() && self.tags.is_empty()
    }
}
