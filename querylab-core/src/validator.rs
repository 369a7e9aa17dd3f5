//! Surface-level query validation.
//!
//! Four rules, checked in order. An empty query stops at the first rule;
//! otherwise every rule runs and contributes at most one message.

use serde::Serialize;
use std::fmt;

pub const EMPTY_QUERY: &str = "Query cannot be empty";
pub const UNBALANCED_PARENTHESES: &str = "Unbalanced parentheses";
pub const INVALID_KEYWORD: &str = "Query must start with a valid SQL keyword";
pub const MISSING_SEMICOLON: &str = "Warning: Query should end with semicolon (;)";

/// Statements a query may start with
pub const LEADING_KEYWORDS: [&str; 8] = [
    "SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "ALTER", "EXPLAIN",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks execution
    Error,
    /// Shown next to the results
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationMessage {
    pub severity: Severity,
    pub message: String,
}

impl ValidationMessage {
    fn error(message: &str) -> Self {
        Self {
            severity: Severity::Error,
            message: message.to_string(),
        }
    }

    fn warning(message: &str) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of [`validate`]. Well-formedness is derived from the messages, so
/// a result carrying an error can never report itself as well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationResult {
    messages: Vec<ValidationMessage>,
}

impl ValidationResult {
    pub fn is_well_formed(&self) -> bool {
        !self.messages.iter().any(|m| m.severity == Severity::Error)
    }

    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.by_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.by_severity(Severity::Warning)
    }

    pub fn contains(&self, message: &str) -> bool {
        self.messages.iter().any(|m| m.message == message)
    }

    fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(move |m| m.severity == severity)
            .map(|m| m.message.as_str())
    }
}

/// Check a raw, untrimmed query string.
pub fn validate(query: &str) -> ValidationResult {
    let mut result = ValidationResult::default();
    let trimmed = query.trim();

    if trimmed.is_empty() {
        result.messages.push(ValidationMessage::error(EMPTY_QUERY));
        return result;
    }

    let open = query.matches('(').count();
    let close = query.matches(')').count();
    if open != close {
        result
            .messages
            .push(ValidationMessage::error(UNBALANCED_PARENTHESES));
    }

    if !starts_with_keyword(trimmed) {
        result.messages.push(ValidationMessage::error(INVALID_KEYWORD));
    }

    if !trimmed.ends_with(';') {
        result
            .messages
            .push(ValidationMessage::warning(MISSING_SEMICOLON));
    }

    result
}

fn starts_with_keyword(text: &str) -> bool {
    LEADING_KEYWORDS.iter().any(|kw| {
        text.get(..kw.len())
            .map(|prefix| prefix.eq_ignore_ascii_case(kw))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_is_terminal() {
        for q in ["", "   ", "\n\t ", "  \r\n"] {
            let result = validate(q);
            assert!(!result.is_well_formed());
            assert_eq!(result.messages().len(), 1);
            assert_eq!(result.messages()[0].message, EMPTY_QUERY);
            assert_eq!(result.messages()[0].severity, Severity::Error);
        }
    }

    #[test]
    fn test_clean_query_has_no_messages() {
        let result = validate("SELECT * FROM students;");
        assert!(result.is_well_formed());
        assert!(result.messages().is_empty());
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let result = validate("SELECT COUNT(*");
        assert!(!result.is_well_formed());
        assert!(result.contains(UNBALANCED_PARENTHESES));

        let result = validate("SELECT COUNT(*));");
        assert!(result.contains(UNBALANCED_PARENTHESES));

        // Counts only, not nesting order
        let result = validate("SELECT )(;");
        assert!(!result.contains(UNBALANCED_PARENTHESES));
    }

    #[test]
    fn test_leading_keyword_case_insensitive() {
        for q in [
            "select 1;",
            "Insert into t values (1);",
            "update t set a = 1;",
            "DELETE FROM t;",
            "create table t (id int);",
            "drop table t;",
            "alter table t add c int;",
            "explain select 1;",
            "   SELECT 1;",
        ] {
            assert!(validate(q).is_well_formed(), "{} should be accepted", q);
        }
    }

    #[test]
    fn test_unknown_keyword_regardless_of_parentheses() {
        let result = validate("banana");
        assert!(!result.is_well_formed());
        assert!(result.contains(INVALID_KEYWORD));

        let result = validate("WITH x AS (SELECT 1) SELECT * FROM x;");
        assert!(result.contains(INVALID_KEYWORD));
        assert!(!result.contains(UNBALANCED_PARENTHESES));

        let result = validate("foo(");
        assert!(result.contains(INVALID_KEYWORD));
        assert!(result.contains(UNBALANCED_PARENTHESES));
    }

    #[test]
    fn test_missing_semicolon_is_only_a_warning() {
        let result = validate("select count(*) from students");
        assert!(result.is_well_formed());
        assert_eq!(result.messages().len(), 1);
        assert_eq!(result.warnings().collect::<Vec<_>>(), vec![MISSING_SEMICOLON]);
        assert_eq!(result.errors().count(), 0);
    }

    #[test]
    fn test_message_order_follows_rules() {
        let result = validate("banana(");
        let messages: Vec<&str> = result.messages().iter().map(|m| m.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![UNBALANCED_PARENTHESES, INVALID_KEYWORD, MISSING_SEMICOLON]
        );
    }

    #[test]
    fn test_trailing_whitespace_after_semicolon() {
        let result = validate("SELECT 1;   \n");
        assert!(result.messages().is_empty());
    }

    #[test]
    fn test_multibyte_prefix_does_not_panic() {
        let result = validate("é");
        assert!(result.contains(INVALID_KEYWORD));
    }
}
