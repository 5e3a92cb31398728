//! Error taxonomy shared across the pipeline.
//!
//! Every layer speaks [`KitError`]. A business error is converted into a
//! `KitError` once, at the endpoint boundary, and keeps its original typed value
//! as the source, so observers further out can still [`KitError::downcast_ref`]
//! it. Middleware never rewrites an error's kind; the rate limiter and circuit
//! breaker only introduce their own.
//!
//! The transport is the single place that maps an [`ErrorKind`] to a wire status.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Classification of a failure, independent of which layer produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The wire payload could not be decoded. Always the client's fault.
    Decode,
    /// A business rule rejected the input (e.g. "integer overflow").
    Validation,
    /// The rate limiter had no token for the call.
    RateLimited,
    /// The circuit breaker refused the call.
    CircuitOpen,
    /// The caller cancelled or the deadline passed.
    Canceled,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Decode => "decode",
            ErrorKind::Validation => "validation",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::CircuitOpen => "circuit_open",
            ErrorKind::Canceled => "canceled",
            ErrorKind::Internal => "internal",
        }
    }

    /// Decode and validation failures: retrying the same request won't help.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, ErrorKind::Decode | ErrorKind::Validation)
    }

    /// Rejections the client should retry later.
    pub fn is_throttled(&self) -> bool {
        matches!(self, ErrorKind::RateLimited | ErrorKind::CircuitOpen)
    }

    pub fn is_server_fault(&self) -> bool {
        matches!(self, ErrorKind::Internal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by business error types to declare their [`ErrorKind`].
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}

/// The error type carried through endpoints, middleware and transports.
#[derive(Clone)]
pub struct KitError {
    kind: ErrorKind,
    message: String,
    source: Option<Arc<dyn StdError + Send + Sync + 'static>>,
}

impl KitError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a typed error, using its `Display` output as the message.
    pub fn with_source<E>(kind: ErrorKind, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            kind,
            message: err.to_string(),
            source: Some(Arc::new(err)),
        }
    }

    /// Wraps a business error that knows its own kind.
    pub fn classified<E>(err: E) -> Self
    where
        E: Classify + StdError + Send + Sync + 'static,
    {
        Self::with_source(err.kind(), err)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn canceled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Canceled, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the wrapped typed error if it is a `T`.
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: StdError + 'static,
    {
        self.source.as_deref().and_then(|e| e.downcast_ref::<T>())
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind == ErrorKind::RateLimited
    }

    pub fn is_circuit_open(&self) -> bool {
        self.kind == ErrorKind::CircuitOpen
    }
}

impl Classify for KitError {
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Debug for KitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KitError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl fmt::Display for KitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for KitError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Implemented by response types that can carry a business failure inside an
/// otherwise successful envelope.
///
/// Transports check this after the endpoint returns `Ok` and route a failed
/// response through the same error encoder as a top-level error. The default
/// reports no failure, so plain responses implement it with an empty impl.
pub trait Failer {
    fn failed(&self) -> Option<KitError> {
        None
    }
}
