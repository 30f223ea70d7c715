//! Error types for pictdb operations.

/// Alias for `Result<T, pictdb::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by pictdb engine and collaborator operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An illegal parameter value, such as an unknown open mode.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The database file name exceeds the 31-byte limit.
    #[error("invalid database filename: {0}")]
    InvalidFilename(String),

    /// The picture id is empty, longer than 127 bytes, or absent on delete.
    #[error("invalid picture id: {0}")]
    InvalidPictId(String),

    /// An insert reused an id already present in the database.
    #[error("duplicate picture id: {0}")]
    DuplicateId(String),

    /// A read referenced an id not present in the database.
    #[error("picture not found: {0}")]
    FileNotFound(String),

    /// An insert was attempted with every metadata slot occupied.
    #[error("database is full")]
    FullDatabase,

    /// A create was requested with `max_files` out of range.
    #[error("max_files out of range: {0}")]
    MaxFiles(u32),

    /// An unknown resolution token or an out-of-range resize dimension.
    #[error("invalid resolution: {0}")]
    Resolutions(String),

    /// A payload buffer could not be allocated.
    #[error("out of memory")]
    OutOfMemory,

    /// A seek, read, write, rename, or remove failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The image codec failed to decode, resize, or encode.
    #[error("codec: {0}")]
    Codec(String),

    /// A required CLI or HTTP parameter is missing.
    #[error("not enough arguments")]
    NotEnoughArguments,

    /// The CLI was invoked with an unknown command.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}
