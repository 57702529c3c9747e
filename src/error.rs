use thiserror::Error;

/// Error that ends a command, carrying the process exit code.
///
/// - 2: configuration or local file I/O
/// - 3: no usable data
/// - 4: upstream source failure
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::new(4, err.to_string())
    }
}

/// Failure of a single call to an external data source.
///
/// Callers recover from these locally (skip the unit of work or fall back to the
/// next strategy); only a command with no remaining option turns one into an
/// `AppError`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request failed with HTTP status {0}")]
    Status(u16),

    #[error("source rejected the request ({code}): {message}")]
    Api { code: String, message: String },

    #[error("malformed payload: {0}")]
    Payload(String),

    #[error("source returned no data")]
    Empty,
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return SourceError::Status(status.as_u16());
        }
        if err.is_decode() {
            return SourceError::Payload(err.to_string());
        }
        SourceError::Request(err.to_string())
    }
}

/// Problem with one record inside an otherwise valid payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unparseable timestamp '{0}'")]
    BadTimestamp(String),
}
