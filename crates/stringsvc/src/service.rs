use futures::future::BoxFuture;
use std::sync::Arc;
use thiserror::Error;
use tower_kit::core::{Classify, Context, ErrorKind, KitError};

/// Operations on strings.
///
/// Implemented by the business logic, by every service middleware, and by the
/// endpoint set (locally or over HTTP), so callers never know which one they
/// hold.
pub trait StringService: Send + Sync {
    /// `s` in upper case. The empty string is rejected.
    fn uppercase(&self, ctx: Context, s: String) -> BoxFuture<'_, Result<String, KitError>>;

    /// Number of characters in `s`.
    fn count(&self, ctx: Context, s: String) -> BoxFuture<'_, Result<usize, KitError>>;
}

impl<T> StringService for Arc<T>
where
    T: StringService + ?Sized,
{
    fn uppercase(&self, ctx: Context, s: String) -> BoxFuture<'_, Result<String, KitError>> {
        (**self).uppercase(ctx, s)
    }

    fn count(&self, ctx: Context, s: String) -> BoxFuture<'_, Result<usize, KitError>> {
        (**self).count(ctx, s)
    }
}

/// Business errors of [`StringService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StringError {
    #[error("empty string")]
    Empty,
}

impl StringError {
    /// Recovers the variant from its message, as carried in a response body.
    pub fn from_message(message: &str) -> Option<Self> {
        [StringError::Empty]
            .into_iter()
            .find(|err| err.to_string() == message)
    }
}

impl Classify for StringError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

impl From<StringError> for KitError {
    fn from(err: StringError) -> Self {
        KitError::classified(err)
    }
}

/// The plain implementation, without middleware.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicService;

impl BasicService {
    pub fn new() -> Self {
        Self
    }
}

impl StringService for BasicService {
    fn uppercase(&self, _ctx: Context, s: String) -> BoxFuture<'_, Result<String, KitError>> {
        Box::pin(async move {
            if s.is_empty() {
                return Err(KitError::from(StringError::Empty));
            }
            Ok(s.to_uppercase())
        })
    }

    fn count(&self, _ctx: Context, s: String) -> BoxFuture<'_, Result<usize, KitError>> {
        Box::pin(async move { Ok::<_, KitError>(s.chars().count()) })
    }
}
