//! Invocation context.
//!
//! Every endpoint call carries a [`Context`] alongside its request. The context
//! holds a cancellation token, an optional deadline and the tracing span of the
//! enclosing layer, so that any layer can stop waiting when the caller gives up.
//!
//! Dropping the request future aborts the chain as well; the context exists for
//! callers that cancel explicitly or impose deadlines.

use crate::error::KitError;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Span;

/// Cancellation, deadline and span for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    span: Span,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// A context with no deadline that is never cancelled unless asked to.
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: None,
            span: Span::none(),
        }
    }

    /// Uses `token` for cancellation instead of a fresh one.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Sets an absolute deadline. An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    /// Sets a deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Replaces the span that child layers should parent their spans to.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancels this context and every clone of it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns an error if the context was cancelled or its deadline passed.
    pub fn check(&self) -> Result<(), KitError> {
        if self.cancel.is_cancelled() {
            return Err(KitError::canceled("context canceled"));
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Err(KitError::canceled("deadline exceeded"))
            }
            _ => Ok(()),
        }
    }

    /// Resolves once the context is cancelled or its deadline passes, returning
    /// the error describing why.
    pub async fn done(&self) -> KitError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.cancel.cancelled() => KitError::canceled("context canceled"),
                _ = tokio::time::sleep_until(deadline) => KitError::canceled("deadline exceeded"),
            },
            None => {
                self.cancel.cancelled().await;
                KitError::canceled("context canceled")
            }
        }
    }
}

/// Access to the [`Context`] of a request type.
pub trait Contextual {
    fn context(&self) -> &Context;
}

/// The envelope an endpoint receives: a context plus one operation's request.
#[derive(Debug, Clone)]
pub struct Invocation<R> {
    pub context: Context,
    pub request: R,
}

impl<R> Invocation<R> {
    /// Wraps `request` with a fresh context.
    pub fn new(request: R) -> Self {
        Self {
            context: Context::new(),
            request,
        }
    }

    pub fn with_context(context: Context, request: R) -> Self {
        Self { context, request }
    }

    pub fn into_parts(self) -> (Context, R) {
        (self.context, self.request)
    }
}

impl<R> Contextual for Invocation<R> {
    fn context(&self) -> &Context {
        &self.context
    }
}
