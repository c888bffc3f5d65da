//! Error types for the Quire resource layer.

/// Result type alias for resource operations.
pub type Result<T> = std::result::Result<T, ResourceError>;

/// Numeric code carried by [`ResourceError::NotFound`].
pub const NOT_FOUND_CODE: i32 = -40000;

/// Numeric code carried by [`ResourceError::OutOfSync`].
pub const OUT_OF_SYNC_CODE: i32 = -40001;

/// Main error type for resource operations.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The backing content of a resource does not exist, or was never established
    #[error("Resource not found: {uri}")]
    NotFound { uri: String },

    /// The expected version does not match the current version of the resource
    #[error("Resource is out of sync: {uri}")]
    OutOfSync { uri: String },

    /// No resolver could produce a resource for the URI
    #[error("A resource provider for '{uri}' is not registered.")]
    Unregistered { uri: String },

    /// An in-memory resource is already registered under the URI
    #[error("Cannot add already existing in-memory resource '{uri}'")]
    AlreadyExists { uri: String },

    /// No in-memory resource is registered under the URI
    #[error("Cannot update non-existent in-memory resource '{uri}'")]
    DoesNotExist { uri: String },

    /// A scheme-bound resolver was asked for a URI it does not serve
    #[error("Unsupported scheme '{scheme}' for resource '{uri}'")]
    UnsupportedScheme { scheme: String, uri: String },

    /// The URI could not be parsed
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// A content change could not be applied to the document
    #[error("Invalid content change: {0}")]
    InvalidChange(String),

    /// The backing bytes are not valid text in a supported encoding
    #[error("Resource '{uri}' does not contain valid UTF-8 text")]
    InvalidEncoding { uri: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResourceError {
    /// Create a new not found error
    pub fn not_found(uri: impl ToString) -> Self {
        Self::NotFound {
            uri: uri.to_string(),
        }
    }

    /// Create a new out of sync error
    pub fn out_of_sync(uri: impl ToString) -> Self {
        Self::OutOfSync {
            uri: uri.to_string(),
        }
    }

    /// Create a new unregistered provider error
    pub fn unregistered(uri: impl ToString) -> Self {
        Self::Unregistered {
            uri: uri.to_string(),
        }
    }

    /// Create a new already exists error
    pub fn already_exists(uri: impl ToString) -> Self {
        Self::AlreadyExists {
            uri: uri.to_string(),
        }
    }

    /// Create a new does not exist error
    pub fn does_not_exist(uri: impl ToString) -> Self {
        Self::DoesNotExist {
            uri: uri.to_string(),
        }
    }

    /// Create a new unsupported scheme error
    pub fn unsupported_scheme(scheme: impl Into<String>, uri: impl ToString) -> Self {
        Self::UnsupportedScheme {
            scheme: scheme.into(),
            uri: uri.to_string(),
        }
    }

    /// Create a new invalid URI error
    pub fn invalid_uri(msg: impl Into<String>) -> Self {
        Self::InvalidUri(msg.into())
    }

    /// Create a new invalid change error
    pub fn invalid_change(msg: impl Into<String>) -> Self {
        Self::InvalidChange(msg.into())
    }

    /// Create a new invalid encoding error
    pub fn invalid_encoding(uri: impl ToString) -> Self {
        Self::InvalidEncoding {
            uri: uri.to_string(),
        }
    }

    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable numeric code of the structured error kinds.
    ///
    /// Only [`ResourceError::NotFound`] and [`ResourceError::OutOfSync`] carry
    /// a code; every other variant returns `None`.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::NotFound { .. } => Some(NOT_FOUND_CODE),
            Self::OutOfSync { .. } => Some(OUT_OF_SYNC_CODE),
            _ => None,
        }
    }

    /// URI payload of the error, if the variant carries one.
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::NotFound { uri }
            | Self::OutOfSync { uri }
            | Self::Unregistered { uri }
            | Self::AlreadyExists { uri }
            | Self::DoesNotExist { uri }
            | Self::UnsupportedScheme { uri, .. }
            | Self::InvalidEncoding { uri } => Some(uri),
            _ => None,
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an out of sync error
    pub fn is_out_of_sync(&self) -> bool {
        matches!(self, Self::OutOfSync { .. })
    }

    /// Check if this is an unregistered provider error
    pub fn is_unregistered(&self) -> bool {
        matches!(self, Self::Unregistered { .. })
    }

    /// Check if this is an already exists error
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Check if this is a does not exist error
    pub fn is_does_not_exist(&self) -> bool {
        matches!(self, Self::DoesNotExist { .. })
    }
}
