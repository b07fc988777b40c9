use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Config,
    Usage,
    NotFound,
    InvalidArgument,
    /// An index file failed structural validation.
    Corrupt,
    /// A spilled partial index could not be reopened for the merge.
    PartialIndex,
    /// The prior index needed for an incremental run is missing or unreadable.
    PriorIndex,
    /// Socket create/bind/listen failures before the daemon starts serving.
    Net,
    Internal,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: String) -> Self {
        Error { kind, context }
    }

    /// Process exit code for fatal errors, one per failure kind.
    ///
    /// Both binaries print the error to stderr and exit with this code.
    /// Nothing is retried; fatal errors are handled where detected.
    pub fn exit_code(&self) -> i32 {
        match self.kind {
            ErrorKind::Usage => 2,
            ErrorKind::Config => 3,
            ErrorKind::Io => 4,
            ErrorKind::PartialIndex => 5,
            ErrorKind::PriorIndex => 6,
            ErrorKind::Corrupt => 7,
            ErrorKind::Net => 8,
            ErrorKind::NotFound => 9,
            ErrorKind::InvalidArgument => 10,
            ErrorKind::Internal => 11,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Config,
            context: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
