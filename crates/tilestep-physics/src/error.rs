use thiserror::Error;
use tilestep_core::BodyId;

/// Physics errors
///
/// Only setup and API misuse surface here. Contact anomalies during a tick are
/// resolved locally and never abort the world.
#[derive(Error, Debug)]
pub enum PhysicsError {
    #[error("Body not found: {0}")]
    BodyNotFound(BodyId),

    #[error("Body '{0}' has no colliders")]
    NoColliders(String),

    #[error("Ground collider {index} out of range for {count} colliders")]
    InvalidGroundCollider { index: usize, count: usize },

    #[error("Body {0} does not have the {1} feature")]
    MissingFeature(BodyId, &'static str),

    #[error("Invalid level '{0}': {1}")]
    InvalidLevel(String, String),

    #[error("Invalid tile layer '{0}': {1}")]
    InvalidTileLayer(String, String),

    #[error("Invalid curve: {0}")]
    InvalidCurve(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for physics operations
pub type PhysicsResult<T> = Result<T, PhysicsError>;
