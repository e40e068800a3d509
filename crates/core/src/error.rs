//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Covers deterministic business failures only: bad SKUs and subdomains,
/// broken order arithmetic, unknown status strings, duplicate keys. Database
/// and transport failures live in the infra/API layers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed validation (malformed SKU/subdomain, negative cents,
    /// unknown status string, empty item list).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated (e.g. order totals overflowing i64
    /// cents, or an order-level discount exceeding the subtotal).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier failed to parse as a UUID.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A uniqueness conflict (duplicate SKU within a tenant, taken subdomain,
    /// replayed webhook event id).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Authorization failure at the domain boundary.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Stable machine-readable code for the error body; the API layer pairs
    /// this with the HTTP status.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::InvalidId(_) => "invalid_id",
            Self::NotFound => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Unauthorized => "forbidden",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_are_stable() {
        assert_eq!(DomainError::validation("bad sku").code(), "validation_error");
        assert_eq!(DomainError::invariant("overflow").code(), "invariant_violation");
        assert_eq!(DomainError::invalid_id("nope").code(), "invalid_id");
        assert_eq!(DomainError::not_found().code(), "not_found");
        assert_eq!(DomainError::conflict("duplicate").code(), "conflict");
        assert_eq!(DomainError::Unauthorized.code(), "forbidden");
    }

    #[test]
    fn display_carries_the_detail() {
        let err = DomainError::validation("sku must not be empty");
        assert_eq!(err.to_string(), "validation failed: sku must not be empty");
    }
}
