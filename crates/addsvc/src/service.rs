use futures::future::BoxFuture;
use std::sync::Arc;
use thiserror::Error;
use tower_kit::core::{Classify, Context, ErrorKind, KitError};

/// Adds things together.
///
/// Implemented by [`BasicService`], by each service middleware, and by the
/// endpoint set, which makes a remote add service look like a local one.
pub trait AddService: Send + Sync {
    /// `a + b`, or [`AddError::Overflow`] if the sum does not fit an `i64`.
    fn sum(&self, ctx: Context, a: i64, b: i64) -> BoxFuture<'_, Result<i64, KitError>>;

    /// `a` followed by `b`, or [`AddError::TwoEmptyStrings`] if both are empty.
    fn concat(&self, ctx: Context, a: String, b: String) -> BoxFuture<'_, Result<String, KitError>>;
}

impl<T> AddService for Arc<T>
where
    T: AddService + ?Sized,
{
    fn sum(&self, ctx: Context, a: i64, b: i64) -> BoxFuture<'_, Result<i64, KitError>> {
        (**self).sum(ctx, a, b)
    }

    fn concat(&self, ctx: Context, a: String, b: String) -> BoxFuture<'_, Result<String, KitError>> {
        (**self).concat(ctx, a, b)
    }
}

/// Business errors of [`AddService`]. All of them are the caller's fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddError {
    #[error("integer overflow")]
    Overflow,
    #[error("two empty strings")]
    TwoEmptyStrings,
    #[error("result exceeds maximum size")]
    MaxSizeExceeded,
}

impl Classify for AddError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

impl From<AddError> for KitError {
    fn from(err: AddError) -> Self {
        KitError::classified(err)
    }
}

/// The plain implementation.
///
/// Concatenation is unbounded unless a maximum length (in characters) is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicService {
    max_concat_len: Option<usize>,
}

impl BasicService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_concat_len(mut self, max: Option<usize>) -> Self {
        self.max_concat_len = max;
        self
    }
}

impl AddService for BasicService {
    fn sum(&self, _ctx: Context, a: i64, b: i64) -> BoxFuture<'_, Result<i64, KitError>> {
        Box::pin(async move { a.checked_add(b).ok_or_else(|| KitError::from(AddError::Overflow)) })
    }

    fn concat(&self, _ctx: Context, a: String, b: String) -> BoxFuture<'_, Result<String, KitError>> {
        let max = self.max_concat_len;
        Box::pin(async move {
            if a.is_empty() && b.is_empty() {
                return Err(KitError::from(AddError::TwoEmptyStrings));
            }
            if let Some(max) = max {
                if a.chars().count() + b.chars().count() > max {
                    return Err(KitError::from(AddError::MaxSizeExceeded));
                }
            }
            Ok(a + &b)
        })
    }
}
