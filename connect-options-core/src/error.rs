//! Status codes and error types.
//!
//! - [`Code`]: Connect status codes
//! - [`Status`]: The error carried through interceptors and stream handles
//! - [`CodecError`]: Failures reported by a [`Codec`](crate::Codec)

/// Connect RPC error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Code {
    Ok = 0,
    Canceled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl Code {
    /// Get the string representation of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Ok => "ok",
            Code::Canceled => "canceled",
            Code::Unknown => "unknown",
            Code::InvalidArgument => "invalid_argument",
            Code::DeadlineExceeded => "deadline_exceeded",
            Code::NotFound => "not_found",
            Code::AlreadyExists => "already_exists",
            Code::PermissionDenied => "permission_denied",
            Code::ResourceExhausted => "resource_exhausted",
            Code::FailedPrecondition => "failed_precondition",
            Code::Aborted => "aborted",
            Code::OutOfRange => "out_of_range",
            Code::Unimplemented => "unimplemented",
            Code::Internal => "internal",
            Code::Unavailable => "unavailable",
            Code::DataLoss => "data_loss",
            Code::Unauthenticated => "unauthenticated",
        }
    }
}

/// Result of an RPC, as seen by interceptors and stream handles.
///
/// The configuration core never produces a `Status` while options are being
/// applied. It exists so that interceptors, codecs, and size checks performed
/// by the call-execution logic share one error vocabulary.
///
/// # Example
///
/// ```
/// use connect_options_core::{Code, Status};
///
/// let status = Status::resource_exhausted("message too large");
/// assert_eq!(status.code(), Code::ResourceExhausted);
/// assert_eq!(status.message(), Some("message too large"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    code: Code,
    message: Option<String>,
}

impl Status {
    /// Create a new status with a code and message.
    pub fn new<S: Into<String>>(code: Code, message: S) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    /// Create a new status with just a code.
    pub fn from_code(code: Code) -> Self {
        Self {
            code,
            message: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> Code {
        self.code
    }

    /// Get the error message.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Create an invalid argument status.
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    /// Create a resource exhausted status.
    pub fn resource_exhausted<S: Into<String>>(message: S) -> Self {
        Self::new(Code::ResourceExhausted, message)
    }

    /// Create an internal status.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(Code::Internal, message)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code.as_str())?;
        if let Some(msg) = &self.message {
            write!(f, ": {}", msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for Status {}

impl From<CodecError> for Status {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::UnsupportedMessage(_) => Status::internal(err.to_string()),
            CodecError::Marshal(_) => Status::internal(err.to_string()),
            CodecError::Unmarshal(_) => Status::invalid_argument(err.to_string()),
        }
    }
}

/// Errors reported by a [`Codec`](crate::Codec).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The codec cannot handle the concrete message type it was given.
    #[error("unsupported message type: {0}")]
    UnsupportedMessage(&'static str),

    /// Encoding the message failed.
    #[error("marshal failed: {0}")]
    Marshal(String),

    /// Decoding the payload failed.
    #[error("unmarshal failed: {0}")]
    Unmarshal(String),
}
