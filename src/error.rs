//! Custom error types for taskdown.
//!
//! Most of the crate deliberately does not use these: a line that is not a
//! task parses to `None`, and a malformed query records its problem on the
//! `Query` value itself so earlier instructions stay usable. The variants
//! here cover the cases where a caller-facing `Result` is the right shape.

use thiserror::Error;

/// Main error type for taskdown operations
#[derive(Error, Debug)]
pub enum TaskdownError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    /// A status cycle references a symbol that is not registered
    #[error("Unknown status symbol in cycle: '{symbol}'")]
    UnknownStatusSymbol { symbol: String },

    // =========================================================================
    // Query Errors
    // =========================================================================
    /// Query source could not be parsed
    #[error("Query error: {message}")]
    Query { message: String },

    /// Placeholder expansion failed (unknown or circular placeholder)
    #[error("Placeholder error in '{statement}': {reason}")]
    Placeholder { statement: String, reason: String },

    /// A filter, sorter or grouper failed while the pipeline was running
    #[error("Search failed in instruction '{instruction}': {message}")]
    SearchFailure {
        instruction: String,
        message: String,
    },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskdownError {
    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a placeholder error
    pub fn placeholder(statement: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Placeholder {
            statement: statement.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-configuration error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error should be shown in place of query results,
    /// rather than aborting the batch of queries being processed.
    pub fn is_query_scoped(&self) -> bool {
        matches!(
            self,
            Self::Query { .. } | Self::Placeholder { .. } | Self::SearchFailure { .. }
        )
    }
}

/// Type alias for taskdown results
pub type Result<T> = std::result::Result<T, TaskdownError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TaskdownError::query("do not understand query");
        assert!(err.to_string().contains("do not understand query"));
    }

    #[test]
    fn test_placeholder_error_carries_statement() {
        let err = TaskdownError::placeholder("path includes {{bad}}", "unknown placeholder");
        let text = err.to_string();
        assert!(text.contains("{{bad}}"));
        assert!(text.contains("unknown placeholder"));
    }

    #[test]
    fn test_is_query_scoped() {
        assert!(TaskdownError::query("x").is_query_scoped());
        assert!(TaskdownError::placeholder("s", "r").is_query_scoped());
        assert!(!TaskdownError::invalid_config("statuses", "empty cycle").is_query_scoped());
    }
}
