//! Error types for CarryLink

use crate::types::PackageStatus;
use thiserror::Error;

/// Main error type for CarryLink
#[derive(Error, Debug)]
pub enum CarryLinkError {
    // Negotiation errors
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Not your turn: {user_id} made the most recent offer")]
    NotYourTurn { user_id: String },

    #[error("Package status {0} does not allow negotiation")]
    InvalidStatusForNegotiation(PackageStatus),

    #[error("Concurrent modification of package {package_id}: expected version {expected}, found {found}")]
    ConcurrentModification {
        package_id: String,
        expected: u64,
        found: u64,
    },

    // Package errors
    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Package already exists: {0}")]
    PackageAlreadyExists(String),

    // Collaborator errors
    #[error("Price advisor error: {0}")]
    PriceAdvisor(String),

    // State persistence errors
    #[error("State corruption detected: {0}")]
    StateCorruption(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfig(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CarryLinkError {
    /// True for errors a caller can resolve by reloading and retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, CarryLinkError::ConcurrentModification { .. })
    }
}

/// Result type alias for CarryLink operations
pub type Result<T> = std::result::Result<T, CarryLinkError>;
