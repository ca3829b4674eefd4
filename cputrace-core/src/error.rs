use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("{0}")]
    InvalidFormat(&'static str),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("session_id {0} already exists")]
    DuplicateSession(String),

    #[error("Trace not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
