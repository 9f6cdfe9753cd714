use thiserror::Error;

/// Why a form submission was rejected. The `Display` text is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} has to be a number")]
    NotANumber { field: &'static str },

    #[error("Inputs have to be positive numbers! ({field} must be greater than zero)")]
    NotPositive { field: &'static str },

    #[error("Click on the map to choose where the workout happened")]
    NoPosition,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage is not available")]
    Unavailable,

    #[error("Storage read error: {0}")]
    Read(String),

    #[error("Storage write error: {0}")]
    Write(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Geolocation is not supported by this browser")]
    Unsupported,

    #[error("Could not get your position: {0}")]
    Denied(String),
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("Map error: {0}")]
    Init(String),
}
