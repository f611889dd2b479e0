use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Malformed document")]
    Serialization(#[from] serde_json::Error),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ambiguous short ID. Did you mean one of these?")]
    AmbiguousId(Vec<(String, String)>), // Vec of (ID, Name)

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid user id: '{0}'")]
    InvalidUserId(String),

    #[error("Section already exists: {0}")]
    SectionExists(String),

    #[error("Section '{0}' is reserved and cannot be added or removed")]
    ReservedSection(String),
}
