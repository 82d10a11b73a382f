//! URL exclusion list for boxed responses.

use regex::Regex;
use serde_json::Value;

use crate::error::PatternError;

/// A single exclusion pattern.
#[derive(Debug, Clone)]
pub enum ExclusionPattern {
    /// Matches a URL that is exactly equal to the string.
    Literal(String),
    /// Matches a URL the expression finds a match in.
    Regex(Regex),
}

impl ExclusionPattern {
    /// Parse a configured pattern.
    ///
    /// A string wrapped in `/` on both ends is compiled as a regular
    /// expression from the text between the slashes; anything else is a
    /// literal URL. A lone `/` counts as wrapped and compiles to the empty
    /// expression, which matches every URL.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        match regex_body(pattern) {
            Some(body) => Regex::new(body)
                .map(Self::Regex)
                .map_err(|e| PatternError::new(pattern, e)),
            None => Ok(Self::Literal(pattern.to_string())),
        }
    }

    /// Check whether a URL matches this pattern.
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Literal(literal) => literal == url,
            Self::Regex(regex) => regex.is_match(url),
        }
    }
}

fn regex_body(pattern: &str) -> Option<&str> {
    if !(pattern.starts_with('/') && pattern.ends_with('/')) {
        return None;
    }
    Some(pattern.get(1..pattern.len() - 1).unwrap_or(""))
}

/// Compiled exclusion list. A URL is excluded when any pattern matches it.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    patterns: Vec<ExclusionPattern>,
}

impl ExclusionList {
    /// An exclusion list that excludes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile a list of configured patterns.
    pub fn compile<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| ExclusionPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Compile from an optional pattern list. `None` excludes nothing.
    pub fn from_option<S: AsRef<str>>(patterns: Option<&[S]>) -> Result<Self, PatternError> {
        match patterns {
            Some(patterns) => Self::compile(patterns),
            None => Ok(Self::empty()),
        }
    }

    /// Compile from an untyped configuration value.
    ///
    /// A value that is not an array excludes nothing. Non-string entries can
    /// never equal a URL and are skipped.
    pub fn from_value(value: &Value) -> Result<Self, PatternError> {
        match value {
            Value::Array(items) => Self::compile(items.iter().filter_map(Value::as_str)),
            _ => Ok(Self::empty()),
        }
    }

    /// Check whether a URL is excluded.
    pub fn is_excluded(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(url))
    }

    /// Number of patterns in the list.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the list has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterate over the compiled patterns.
    pub fn patterns(&self) -> impl Iterator<Item = &ExclusionPattern> {
        self.patterns.iter()
    }
}

/// Check a URL against an optional list of configured patterns.
pub fn is_excluded<S: AsRef<str>>(url: &str, patterns: Option<&[S]>) -> Result<bool, PatternError> {
    Ok(ExclusionList::from_option(patterns)?.is_excluded(url))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // === Pattern Parsing ===

    #[test]
    fn test_literal_pattern() {
        let pattern = ExclusionPattern::parse("/posts/1").unwrap();
        assert!(matches!(pattern, ExclusionPattern::Literal(_)));
        assert!(pattern.matches("/posts/1"));
        assert!(!pattern.matches("/posts/10"));
        assert!(!pattern.matches("/posts/1?x=1"));
    }

    #[test]
    fn test_regex_pattern() {
        let pattern = ExclusionPattern::parse(r"/^\/users\//").unwrap();
        assert!(matches!(pattern, ExclusionPattern::Regex(_)));
        assert!(pattern.matches("/users/42"));
        assert!(!pattern.matches("/admin/users/42"));
    }

    #[test]
    fn test_unanchored_regex_matches_anywhere() {
        let pattern = ExclusionPattern::parse("/session/").unwrap();
        assert!(pattern.matches("/api/session/current"));
    }

    #[test]
    fn test_lone_slash_is_empty_regex() {
        let pattern = ExclusionPattern::parse("/").unwrap();
        assert!(matches!(pattern, ExclusionPattern::Regex(_)));
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/posts"));

        let list = ExclusionList::compile(["/"]).unwrap();
        assert!(list.is_excluded("/posts/1"));
    }

    #[test]
    fn test_lookaround_is_rejected() {
        let err = ExclusionPattern::parse(r"/^\/(?!public)/").unwrap_err();
        assert_eq!(err.pattern(), r"/^\/(?!public)/");
    }

    #[test]
    fn test_double_slash_is_empty_regex() {
        let pattern = ExclusionPattern::parse("//").unwrap();
        assert!(pattern.matches("/anything"));
    }

    #[test]
    fn test_invalid_regex_fails() {
        let err = ExclusionPattern::parse("/(unclosed/").unwrap_err();
        assert_eq!(err.pattern(), "/(unclosed/");
    }

    // === Lists ===

    #[test]
    fn test_list_is_logical_or() {
        let list = ExclusionList::compile(["/posts/1", r"/^\/users\//"]).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.is_excluded("/posts/1"));
        assert!(list.is_excluded("/users/42"));
        assert!(!list.is_excluded("/comments/1"));
    }

    #[test]
    fn test_empty_list_excludes_nothing() {
        let list = ExclusionList::empty();
        assert!(list.is_empty());
        assert!(!list.is_excluded("/posts/1"));
    }

    #[test]
    fn test_compile_reports_first_bad_pattern() {
        let err = ExclusionList::compile(["/ok", "/[/", "/(/"]).unwrap_err();
        assert_eq!(err.pattern(), "/[/");
    }

    #[test]
    fn test_from_value_non_array() {
        for value in [json!(null), json!("/posts/1"), json!({"0": "/posts/1"}), json!(7)] {
            let list = ExclusionList::from_value(&value).unwrap();
            assert!(!list.is_excluded("/posts/1"));
        }
    }

    #[test]
    fn test_from_value_skips_non_strings() {
        let list = ExclusionList::from_value(&json!(["/a", 1, null, ["/b"], "/c"])).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.is_excluded("/a"));
        assert!(!list.is_excluded("/b"));
        assert!(list.is_excluded("/c"));
    }

    // === Free Function ===

    #[test]
    fn test_is_excluded_without_patterns() {
        assert!(!is_excluded::<&str>("/posts/1", None).unwrap());
    }

    #[test]
    fn test_is_excluded_with_patterns() {
        let patterns = vec!["/posts/1".to_string(), r"/^\/users\//".to_string()];
        assert!(is_excluded("/posts/1", Some(patterns.as_slice())).unwrap());
        assert!(is_excluded("/users/42", Some(patterns.as_slice())).unwrap());
        assert!(!is_excluded("/comments/1", Some(patterns.as_slice())).unwrap());
    }

    #[test]
    fn test_is_excluded_surfaces_pattern_error() {
        let patterns = ["/(/"];
        assert!(is_excluded("/posts/1", Some(&patterns[..])).is_err());
    }
}
