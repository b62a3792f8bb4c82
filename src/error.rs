use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Notification container not mounted: {0}")]
    MountPoint(String),

    #[error("Notification message must not be empty")]
    EmptyNotification,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl serde::Serialize for ConsoleError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
