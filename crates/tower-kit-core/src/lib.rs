//! Core infrastructure for tower-kit.
//!
//! This crate provides the pieces every other tower-kit crate builds on:
//! - [`Context`] and [`Invocation`]: the per-request cancellation/deadline
//!   context and the envelope an endpoint receives
//! - [`KitError`] and [`ErrorKind`]: the error taxonomy shared by services,
//!   middleware and transports
//! - [`Failer`]: the capability a response implements when it embeds its own failure
//! - [`Chain`]: an ordered middleware list folded into one immutable target
//! - [`MetricsRecorder`] and [`Tracer`]: narrow interfaces to observability backends
//! - [`Listeners`]: callbacks for events emitted by stateful middleware

pub mod chain;
pub mod context;
pub mod error;
pub mod events;
pub mod recorder;

pub use chain::{Chain, Middleware};
pub use context::{Context, Contextual, Invocation};
pub use error::{Classify, ErrorKind, Failer, KitError};
pub use events::Listeners;
pub use recorder::{MetricsFacade, MetricsRecorder, Tags, Tracer, TracingTracer};
