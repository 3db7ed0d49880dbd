//! Engine error types.
//!
//! Recomputing never fails; errors come from loading documents, rejected
//! mutations and the binary's file handling.

use sheetforge_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A document mutation or load was rejected by the domain.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Reading or writing a document failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A document or summary could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_convert() {
        let err: EngineError = DomainError::not_found("Trait", "abc").into();
        assert!(matches!(err, EngineError::Domain(_)));
        assert!(err.to_string().contains("Trait"));
    }

    #[test]
    fn json_errors_convert() {
        let parse = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        let err: EngineError = parse.into();
        assert!(err.to_string().starts_with("JSON error"));
    }
}
