use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Decode error in slot '{0}': {1}")]
    Decode(String, String),

    #[error("Encode error for collection '{0}': {1}")]
    Encode(String, String),

    #[error("Storage read failed for slot '{0}': {1}")]
    StorageRead(String, String),

    #[error("Storage write failed for slot '{0}': {1}")]
    StorageWrite(String, String),

    #[error("Identifier '{0}' already exists in collection '{1}'")]
    DuplicateId(String, String),

    #[error("Invalid collection name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),
}

impl StoreError {
    /// True for failures raised by the durable engine while writing.
    pub fn is_write_failure(&self) -> bool {
        matches!(self, Self::StorageWrite(..))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::ExecutionError(format!("blocking task join: {}", err))
    }
}
