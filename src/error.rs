//! Errors returned by connections and the resolver.

use serde_json::Value;
use thiserror::Error;

/// Error name the resolver replies with for an unknown interface.
pub const INTERFACE_NOT_FOUND: &str = "org.varlink.resolver.InterfaceNotFound";

/// A well-formed reply that reports failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{name}")]
pub struct ServiceError {
    /// Fully-qualified error name, e.g. `org.varlink.resolver.InterfaceNotFound`.
    pub name: String,
    pub parameters: Option<Value>,
}

impl ServiceError {
    pub fn new(name: impl Into<String>, parameters: Option<Value>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    pub fn is_interface_not_found(&self) -> bool {
        self.name == INTERFACE_NOT_FOUND
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unsupported transport: {0}")]
    UnsupportedTransport(String),

    #[error("method name is not fully qualified: {0}")]
    InvalidMethodName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    /// Reply parameters did not match the requested type.
    #[error("cannot decode reply parameters: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("connection is unusable after an earlier failure")]
    ConnectionBroken,

    #[error("the More and Oneway flags cannot be combined")]
    ConflictingFlags,

    #[error("a previous call on this connection is still receiving replies")]
    CallInProgress,

    #[error("no reply pending for this call")]
    NoReplyPending,

    #[error("received invalid interface description for {0}")]
    InvalidInterface(String),

    #[error("{0}")]
    Service(#[from] ServiceError),
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport or framing failure; the connection cannot be used again.
    Protocol,
    /// The service answered with an error reply.
    Service,
    /// Misuse detected before anything was written.
    Caller,
    /// An interface description did not parse.
    Parse,
    /// Reply parameters did not fit the caller's type; the connection is
    /// still usable.
    Decode,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_)
            | Error::Json(_)
            | Error::ProtocolViolation(_)
            | Error::ConnectionBroken => ErrorKind::Protocol,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Service(_) => ErrorKind::Service,
            Error::InvalidAddress(_)
            | Error::UnsupportedTransport(_)
            | Error::InvalidMethodName(_)
            | Error::ConnectionClosed
            | Error::ConflictingFlags
            | Error::CallInProgress
            | Error::NoReplyPending => ErrorKind::Caller,
            Error::InvalidInterface(_) => ErrorKind::Parse,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceError> {
        match self {
            Error::Service(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_interface_not_found(&self) -> bool {
        self.as_service()
            .is_some_and(ServiceError::is_interface_not_found)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn service_error_keeps_name() {
        let err = Error::from(ServiceError::new(INTERFACE_NOT_FOUND, Some(json!({"interface": "x.y"}))));
        assert_eq!(err.kind(), ErrorKind::Service);
        assert!(err.is_interface_not_found());
        assert_eq!(err.to_string(), INTERFACE_NOT_FOUND);
    }

    #[test]
    fn kinds() {
        assert_eq!(Error::ConflictingFlags.kind(), ErrorKind::Caller);
        assert_eq!(Error::ConnectionClosed.kind(), ErrorKind::Caller);
        assert_eq!(
            Error::from(std::io::Error::from(std::io::ErrorKind::UnexpectedEof)).kind(),
            ErrorKind::Protocol
        );
        assert_eq!(Error::InvalidInterface("a.b".into()).kind(), ErrorKind::Parse);
        let mismatch = serde_json::from_str::<i64>("\"x\"").expect_err("mismatch");
        assert_eq!(Error::Decode(mismatch).kind(), ErrorKind::Decode);
        assert!(!Error::ConnectionBroken.is_interface_not_found());
    }
}
