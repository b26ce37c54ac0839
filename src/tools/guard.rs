//! Input guards shared by the tool handlers.
//!
//! Two distinct protections live here:
//! - `validate_readonly` gates free-form query text down to SELECT statements
//! - `quote_identifier` validates and brackets schema/table names that must
//!   be interpolated into statement text (T-SQL has no parameter slots for
//!   identifiers)
//!
//! Values never go through either path; they are always bound as parameters
//! by the callers.

use crate::error::{DbError, DbResult};

/// Maximum identifier length accepted, matching sysname (nvarchar(128)).
const MAX_IDENTIFIER_LEN: usize = 128;

/// Reject any statement that is not a SELECT.
///
/// The check is a lexical prefix gate over the trimmed, case-folded text.
/// Anything else, including otherwise read-only constructs such as
/// `WITH ... SELECT`, is rejected so the accepted surface stays easy to
/// reason about.
pub fn validate_readonly(query: &str) -> DbResult<()> {
    let trimmed = query.trim();

    if trimmed.is_empty() {
        return Err(DbError::invalid_input("Query must not be empty"));
    }

    if !trimmed.to_lowercase().starts_with("select") {
        let keyword = trimmed
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_uppercase();
        return Err(DbError::invalid_input(format!(
            "Only SELECT statements are allowed, got '{keyword}'"
        )));
    }

    Ok(())
}

/// Validate an identifier and return it bracket-quoted for interpolation.
///
/// Closing brackets are doubled, so `My]Table` becomes `[My]]Table]` and
/// cannot terminate the quoting early.
pub fn quote_identifier(raw: &str) -> DbResult<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(DbError::invalid_input("Identifier must not be empty"));
    }

    if trimmed.chars().count() > MAX_IDENTIFIER_LEN {
        return Err(DbError::invalid_input(format!(
            "Identifier exceeds {MAX_IDENTIFIER_LEN} characters"
        )));
    }

    if trimmed.chars().any(char::is_control) {
        return Err(DbError::invalid_input(
            "Identifier contains control characters",
        ));
    }

    Ok(format!("[{}]", trimmed.replace(']', "]]")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_select() {
        assert!(validate_readonly("SELECT 1").is_ok());
        assert!(validate_readonly("select * from dbo.Orders").is_ok());
    }

    #[test]
    fn test_accepts_select_with_surrounding_whitespace() {
        assert!(validate_readonly("  \n\tSELECT 1  ").is_ok());
    }

    #[test]
    fn test_accepts_mixed_case_select() {
        assert!(validate_readonly("SeLeCt name FROM sys.tables").is_ok());
    }

    #[test]
    fn test_rejects_empty_query() {
        let err = validate_readonly("   ").unwrap_err();
        assert!(matches!(err, DbError::InvalidInput { .. }));
    }

    #[test]
    fn test_rejects_mutating_statements() {
        for query in [
            "INSERT INTO t VALUES (1)",
            "UPDATE t SET a = 1",
            "DELETE FROM t",
            "DROP TABLE t",
            "TRUNCATE TABLE t",
            "EXEC sp_who",
        ] {
            assert!(validate_readonly(query).is_err(), "accepted: {query}");
        }
    }

    #[test]
    fn test_rejects_cte_prefix() {
        // WITH ... SELECT is read-only but falls outside the prefix gate.
        let err = validate_readonly("WITH x AS (SELECT 1) SELECT * FROM x").unwrap_err();
        assert!(err.to_string().contains("WITH"));
    }

    #[test]
    fn test_rejection_names_leading_keyword() {
        let err = validate_readonly("delete from t").unwrap_err();
        assert!(err.to_string().contains("DELETE"));
    }

    #[test]
    fn test_quote_plain_identifier() {
        assert_eq!(quote_identifier("Orders").unwrap(), "[Orders]");
        assert_eq!(quote_identifier("  dbo  ").unwrap(), "[dbo]");
    }

    #[test]
    fn test_quote_escapes_closing_bracket() {
        assert_eq!(quote_identifier("My]Table").unwrap(), "[My]]Table]");
    }

    #[test]
    fn test_quote_allows_spaces_and_punctuation() {
        assert_eq!(quote_identifier("Order Details").unwrap(), "[Order Details]");
        assert_eq!(
            quote_identifier("odd'name\"; --").unwrap(),
            "[odd'name\"; --]"
        );
    }

    #[test]
    fn test_quote_rejects_empty() {
        assert!(quote_identifier("").is_err());
        assert!(quote_identifier("   ").is_err());
    }

    #[test]
    fn test_quote_rejects_oversized() {
        let long = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(quote_identifier(&long).is_err());
        assert!(quote_identifier(&"a".repeat(MAX_IDENTIFIER_LEN)).is_ok());
    }

    #[test]
    fn test_quote_rejects_control_characters() {
        assert!(quote_identifier("bad\0name").is_err());
        assert!(quote_identifier("bad\nname").is_err());
    }
}
