//! Error types for canasta operations.
//!
//! Failures split into two tiers: structural problems (bad input tables,
//! querying before `fit`, invalid configuration) surface as explicit errors,
//! while per-row data-quality issues are dropped by the caller and counted
//! rather than failing a whole request.

use std::fmt;

/// Main error type for canasta operations.
///
/// # Examples
///
/// ```
/// use canasta::error::CanastaError;
///
/// let err = CanastaError::InvalidCatalog {
///     message: "product table is empty".to_string(),
/// };
/// assert!(err.to_string().contains("invalid catalog"));
/// ```
#[derive(Debug)]
pub enum CanastaError {
    /// Product table is empty or a row is missing a mandatory field.
    InvalidCatalog {
        /// What was wrong with the catalog input
        message: String,
    },

    /// Transaction table is structurally unusable.
    InvalidTransactions {
        /// What was wrong with the transaction input
        message: String,
    },

    /// A query method was called before `fit` completed.
    NotFitted {
        /// The operation that was attempted
        operation: String,
    },

    /// Invalid configuration value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Serialization/deserialization error (rule tables, strategy tables).
    Serialization(String),

    /// I/O error (config file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for CanastaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanastaError::InvalidCatalog { message } => {
                write!(f, "invalid catalog: {message}")
            }
            CanastaError::InvalidTransactions { message } => {
                write!(f, "invalid transactions: {message}")
            }
            CanastaError::NotFitted { operation } => {
                write!(f, "{operation} called before fit; call fit first")
            }
            CanastaError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            CanastaError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            CanastaError::Io(e) => write!(f, "I/O error: {e}"),
            CanastaError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CanastaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CanastaError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CanastaError {
    fn from(err: std::io::Error) -> Self {
        CanastaError::Io(err)
    }
}

impl From<serde_json::Error> for CanastaError {
    fn from(err: serde_json::Error) -> Self {
        CanastaError::Serialization(err.to_string())
    }
}

impl From<&str> for CanastaError {
    fn from(msg: &str) -> Self {
        CanastaError::Other(msg.to_string())
    }
}

impl From<String> for CanastaError {
    fn from(msg: String) -> Self {
        CanastaError::Other(msg)
    }
}

impl CanastaError {
    /// Create an invalid-catalog error with descriptive context.
    #[must_use]
    pub fn invalid_catalog(message: impl Into<String>) -> Self {
        Self::InvalidCatalog {
            message: message.into(),
        }
    }

    /// Create an invalid-transactions error with descriptive context.
    #[must_use]
    pub fn invalid_transactions(message: impl Into<String>) -> Self {
        Self::InvalidTransactions {
            message: message.into(),
        }
    }

    /// Create a not-fitted error naming the operation that was attempted.
    #[must_use]
    pub fn not_fitted(operation: &str) -> Self {
        Self::NotFitted {
            operation: operation.to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, CanastaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_catalog_display() {
        let err = CanastaError::invalid_catalog("product table is empty");
        assert!(err.to_string().contains("invalid catalog"));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_invalid_transactions_display() {
        let err = CanastaError::invalid_transactions("no row references a cataloged product");
        assert!(err.to_string().contains("invalid transactions"));
    }

    #[test]
    fn test_not_fitted_display() {
        let err = CanastaError::not_fitted("get_recommendations");
        let msg = err.to_string();
        assert!(msg.contains("get_recommendations"));
        assert!(msg.contains("fit"));
    }

    #[test]
    fn test_invalid_hyperparameter_display() {
        let err = CanastaError::InvalidHyperparameter {
            param: "n_recommendations".to_string(),
            value: "0".to_string(),
            constraint: ">0".to_string(),
        };
        assert!(err.to_string().contains("Invalid hyperparameter"));
        assert!(err.to_string().contains("n_recommendations"));
        assert!(err.to_string().contains(">0"));
    }

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CanastaError::Io(io_err);
        let msg = err.to_string();
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_from_str() {
        let err: CanastaError = "test error".into();
        assert!(matches!(err, CanastaError::Other(_)));
        assert_eq!(err.to_string(), "test error");
    }

    #[test]
    fn test_from_string() {
        let err: CanastaError = "test error".to_string().into();
        assert!(matches!(err, CanastaError::Other(_)));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: CanastaError = io_err.into();
        assert!(matches!(err, CanastaError::Io(_)));
    }

    #[test]
    fn test_error_source_io() {
        use std::error::Error;
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CanastaError::Io(io_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_source_other() {
        use std::error::Error;
        let err = CanastaError::Other("test".to_string());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_serialization_error_from_serde_json() {
        let parse_err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
        let err: CanastaError = parse_err.into();
        assert!(matches!(err, CanastaError::Serialization(_)));
        assert!(err.to_string().contains("Serialization"));
    }
}
