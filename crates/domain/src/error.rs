//! Unified error types for the domain layer
//!
//! Numeric rules never fail: malformed scalar text becomes zero and negative
//! intermediate values are valid results. Errors are reserved for structural
//! mutations (unknown rows, illegal moves) and document loading.

use thiserror::Error;

use crate::value_objects::DiceParseError;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Row or entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Structural rule violation (cycles, children under a leaf, duplicate ids)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization of row content failed
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Document was written by a newer schema than this build understands
    #[error("Document schema version {found} is newer than supported version {supported}")]
    SchemaTooNew { found: u32, supported: u32 },

    /// Document predates the oldest schema this build can read
    #[error("Document schema version {found} is older than minimum version {minimum}")]
    SchemaTooOld { found: u32, minimum: u32 },
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// # Example
    /// ```ignore
    /// if quantity > MAX_QUANTITY {
    ///     return Err(DomainError::validation("Quantity is out of range"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

impl From<DiceParseError> for DomainError {
    fn from(err: DiceParseError) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("quantity out of range");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: quantity out of range");
    }

    #[test]
    fn test_not_found_error() {
        let err = DomainError::not_found("Equipment", "123e4567-e89b-12d3-a456-426614174000");
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(err.to_string().contains("Equipment"));
        assert!(err.to_string().contains("123e4567"));
    }

    #[test]
    fn test_constraint_error() {
        let err = DomainError::constraint("row cannot contain itself");
        assert_eq!(
            err.to_string(),
            "Constraint violation: row cannot contain itself"
        );
    }

    #[test]
    fn test_from_dice_parse_error() {
        let domain_err: DomainError = DiceParseError::Empty.into();
        assert!(matches!(domain_err, DomainError::Parse(_)));
        assert!(domain_err.to_string().contains("Empty dice"));
    }

    #[test]
    fn test_schema_errors() {
        let err = DomainError::SchemaTooNew {
            found: 9,
            supported: 2,
        };
        assert!(err.to_string().contains("newer"));
        let err = DomainError::SchemaTooOld {
            found: 0,
            minimum: 1,
        };
        assert!(err.to_string().contains("older"));
    }
}
