//! Request DTOs for the service API
//!
//! Defines the structure of incoming query strings. Restaurant bodies live
//! with the entity in `restaurant::model`.

use serde::Deserialize;

/// Query string of the cache inspection endpoints
/// (`GET /v1/cache/keys`, `DELETE /v1/cache`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatternQuery {
    /// Glob pattern selecting keys
    #[serde(default)]
    pub pattern: Option<String>,
}

impl PatternQuery {
    /// Pattern to list with, `*` when absent.
    pub fn pattern_or_all(&self) -> &str {
        self.pattern.as_deref().unwrap_or("*")
    }

    /// Validates the pattern for bulk removal
    ///
    /// Removal requires an explicit, non-blank pattern. Returns an error
    /// message if validation fails, None if valid.
    pub fn validate_for_removal(&self) -> Option<String> {
        match self.pattern.as_deref() {
            Some(pattern) if !pattern.trim().is_empty() => None,
            _ => Some("A non-empty pattern is required".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_defaults_to_all() {
        let query: PatternQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.pattern_or_all(), "*");
        assert!(query.validate_for_removal().is_some());
    }

    #[test]
    fn test_validate_pattern() {
        let blank = PatternQuery {
            pattern: Some("  ".to_string()),
        };
        assert!(blank.validate_for_removal().is_some());

        let query = PatternQuery {
            pattern: Some("restaurant:*".to_string()),
        };
        assert!(query.validate_for_removal().is_none());
        assert_eq!(query.pattern_or_all(), "restaurant:*");
    }
}
