use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported telemetry version {found:#x} (minimum {minimum:#x})")]
    UnsupportedVersion { found: u32, minimum: u32 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("Failed to register {what} (result code {code})")]
    Registration { what: String, code: i32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The snapshot or session directory does not exist yet, as before the
    /// first game start.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
