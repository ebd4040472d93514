//! Filter translation errors
//!
//! Every failure raised while turning a filter expression into a
//! [`QuerySpec`](super::QuerySpec) is a request-level failure. The first six
//! variants are client input problems; `QueryExecution` and `Unexpected`
//! are server-side.

use thiserror::Error;

/// Fixed message for malformed timestamp literals
pub const DATE_FORMAT_MESSAGE: &str = "Please specify dates in format \"yyyy-MM-dd'T'HH:mm:ss\"";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Character adjoining a bracket is not `;` or `,`
    #[error("illegal pivot operator '{found}' at index {position}")]
    InvalidPivotOperator { found: char, position: usize },

    /// Unmatched `(` or stray `)`
    #[error("{message} (index {position})")]
    UnbalancedBracket { position: usize, message: String },

    /// Components and pivots do not line up during merging
    #[error(
        "There is a mis use of pivot operators (; & ,). Please recorrect query string and try again"
    )]
    PivotCountMismatch { components: usize, pivots: usize },

    /// A sub-expression that decomposes to nothing
    #[error("Please specify a not-null complex query (index {position})")]
    EmptyExpression { position: usize },

    /// Primitive fragment does not match any operator shape
    #[error(
        "operator used with query string \"{fragment}\" is invalid. Please specify a valid operator."
    )]
    UnsupportedOperator { fragment: String },

    /// Literal could not be converted to the field's type
    #[error("{message}")]
    Coercion { field: String, message: String },

    /// Data store rejected the assembled query
    #[error("Query execution failed: {0}")]
    QueryExecution(String),

    /// Anything else
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl QueryError {
    pub fn unmatched_open(position: usize) -> Self {
        Self::UnbalancedBracket {
            position,
            message: format!(
                "Respective closing bracket for the opening bracket at index {} was not found",
                position
            ),
        }
    }

    pub fn stray_close(fragment: &str, position: usize) -> Self {
        Self::UnbalancedBracket {
            position,
            message: format!(
                "A closing bracket in the complex query {} doesn't match any opening brackets",
                fragment
            ),
        }
    }

    pub fn coercion(field: &str, message: impl Into<String>) -> Self {
        Self::Coercion {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::QueryExecution(message.into())
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPivotOperator { .. } => "INVALID_PIVOT_OPERATOR",
            Self::UnbalancedBracket { .. } => "UNBALANCED_BRACKET",
            Self::PivotCountMismatch { .. } => "PIVOT_COUNT_MISMATCH",
            Self::EmptyExpression { .. } => "EMPTY_EXPRESSION",
            Self::UnsupportedOperator { .. } => "UNSUPPORTED_OPERATOR",
            Self::Coercion { .. } => "COERCION_ERROR",
            Self::QueryExecution(_) => "QUERY_EXECUTION",
            Self::Unexpected(_) => "INTERNAL",
        }
    }

    /// True when the caller supplied bad input
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::QueryExecution(_) | Self::Unexpected(_))
    }
}
