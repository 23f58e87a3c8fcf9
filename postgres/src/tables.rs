//! Table names used by the store and the ancestor lookups.
//!
//! Names are interpolated into SQL text, so they are restricted to plain
//! identifiers: ASCII letters, digits and underscores, not starting with a
//! digit, at most 63 bytes.

use thiserror::Error;

/// Longest identifier `PostgreSQL` keeps without truncation.
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// A configured table name is not a plain SQL identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid table name: {0:?}")]
pub struct InvalidTableName(pub String);

/// Names of the tables read and written by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// Action documents (owned by this service).
    pub actions: String,
    /// Customer records (read-only).
    pub customers: String,
    /// Interaction records (read-only).
    pub interactions: String,
    /// Action-plan records (read-only).
    pub action_plans: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            actions: "actions".to_string(),
            customers: "customers".to_string(),
            interactions: "interactions".to_string(),
            action_plans: "action_plans".to_string(),
        }
    }
}

impl TableNames {
    /// Check every name is a plain identifier.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvalidTableName`].
    pub fn validate(&self) -> Result<(), InvalidTableName> {
        for name in [
            &self.actions,
            &self.customers,
            &self.interactions,
            &self.action_plans,
        ] {
            validate_identifier(name)?;
        }
        Ok(())
    }
}

/// Check `name` is a plain SQL identifier.
///
/// # Errors
///
/// Returns [`InvalidTableName`] if it is not.
pub fn validate_identifier(name: &str) -> Result<(), InvalidTableName> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_start && valid_rest && name.len() <= MAX_IDENTIFIER_LENGTH {
        Ok(())
    } else {
        Err(InvalidTableName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(TableNames::default().validate(), Ok(()));
    }

    #[test]
    fn identifiers() {
        assert!(validate_identifier("actions_v2").is_ok());
        assert!(validate_identifier("_staging").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("2actions").is_err());
        assert!(validate_identifier("actions; DROP TABLE customers").is_err());
        assert!(validate_identifier("public.actions").is_err());
        assert!(validate_identifier(&"a".repeat(64)).is_err());
    }

    #[test]
    fn validate_reports_offending_name() {
        let tables = TableNames {
            interactions: "bad-name".to_string(),
            ..TableNames::default()
        };
        assert_eq!(tables.validate(), Err(InvalidTableName("bad-name".to_string())));
    }
}
