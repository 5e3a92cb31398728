use crate::service::AddService;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use tower_kit::circuitbreaker::{CircuitBreakerConfig, ServerFaultClassifier};
use tower_kit::core::{Context, Failer, Invocation, KitError, MetricsRecorder, Tracer};
use tower_kit::endpoint::{
    endpoint_fn, Endpoint, EndpointBuilder, InstrumentingLayer, LoggingLayer, TracingLayer,
};
use tower_kit::ratelimiter::RateLimiterConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumRequest {
    pub a: i64,
    pub b: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumResponse {
    pub v: i64,
}

impl Failer for SumResponse {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcatRequest {
    pub a: String,
    pub b: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcatResponse {
    pub v: String,
}

impl Failer for ConcatResponse {}

/// Token bucket parameters for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    /// Burst size.
    pub capacity: usize,
    /// Tokens added per second.
    pub per_second: f64,
}

/// Everything the endpoint middleware needs.
///
/// The defaults allow one sum per second and a hundred concats per second,
/// reject rather than wait when a bucket is empty, open a breaker after five
/// consecutive server faults and keep it open for a minute. No metrics or
/// spans are recorded unless a recorder or tracer is supplied.
#[derive(Clone)]
pub struct EndpointSettings {
    pub sum_limit: RateLimit,
    pub concat_limit: RateLimit,
    pub max_wait: Duration,
    pub failure_threshold: usize,
    pub cooldown: Duration,
    pub recorder: Option<Arc<dyn MetricsRecorder>>,
    pub tracer: Option<Arc<dyn Tracer>>,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            sum_limit: RateLimit {
                capacity: 1,
                per_second: 1.0,
            },
            concat_limit: RateLimit {
                capacity: 100,
                per_second: 100.0,
            },
            max_wait: Duration::ZERO,
            failure_threshold: 5,
            cooldown: Duration::from_secs(60),
            recorder: None,
            tracer: None,
        }
    }
}

impl EndpointSettings {
    pub fn with_recorder(mut self, recorder: Arc<dyn MetricsRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn with_tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// The middleware stack for one operation, outermost first: instrumenting,
    /// logging, tracing, circuit breaker, rate limiter.
    ///
    /// The breaker sits outside the limiter so a throttled call counts as a
    /// rejection, not a fault. Both are named after the operation.
    fn builder<Req, Res>(&self, operation: &'static str, limit: RateLimit) -> EndpointBuilder<Req, Res>
    where
        Req: fmt::Debug + Send + 'static,
        Res: fmt::Debug + Send + 'static,
    {
        let name = operation.to_lowercase();

        EndpointBuilder::new()
            .layer(InstrumentingLayer::new(operation, self.recorder.clone()))
            .layer(LoggingLayer::new(operation))
            .layer(TracingLayer::new(operation, self.tracer.clone()))
            .layer(
                CircuitBreakerConfig::builder()
                    .name(name.clone())
                    .failure_threshold(self.failure_threshold)
                    .wait_duration_in_open(self.cooldown)
                    .classifier(ServerFaultClassifier)
                    .build(),
            )
            .layer(
                RateLimiterConfig::builder()
                    .name(name)
                    .capacity(limit.capacity)
                    .refill_per_second(limit.per_second)
                    .max_wait(self.max_wait)
                    .build(),
            )
    }
}

impl fmt::Debug for EndpointSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointSettings")
            .field("sum_limit", &self.sum_limit)
            .field("concat_limit", &self.concat_limit)
            .field("max_wait", &self.max_wait)
            .field("failure_threshold", &self.failure_threshold)
            .field("cooldown", &self.cooldown)
            .field("recorder", &self.recorder.is_some())
            .field("tracer", &self.tracer.is_some())
            .finish()
    }
}

pub fn make_sum_endpoint(svc: Arc<dyn AddService>) -> Endpoint<SumRequest, SumResponse> {
    endpoint_fn(move |ctx: Context, req: SumRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let v = svc.sum(ctx, req.a, req.b).await?;
            Ok::<_, KitError>(SumResponse { v })
        }
    })
}

pub fn make_concat_endpoint(svc: Arc<dyn AddService>) -> Endpoint<ConcatRequest, ConcatResponse> {
    endpoint_fn(move |ctx: Context, req: ConcatRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let v = svc.concat(ctx, req.a, req.b).await?;
            Ok::<_, KitError>(ConcatResponse { v })
        }
    })
}

/// The sum and concat endpoints of one add service.
///
/// Server side, [`Endpoints::new`] adapts a service and wraps it in the
/// middleware from [`EndpointSettings`]. Client side,
/// [`crate::http::client`] builds them from HTTP clients. Both implement
/// [`AddService`], so either can be handed to code expecting a service.
#[derive(Clone)]
pub struct Endpoints {
    pub sum: Endpoint<SumRequest, SumResponse>,
    pub concat: Endpoint<ConcatRequest, ConcatResponse>,
}

impl Endpoints {
    pub fn new(svc: Arc<dyn AddService>, settings: &EndpointSettings) -> Self {
        Self {
            sum: make_sum_endpoint(Arc::clone(&svc)),
            concat: make_concat_endpoint(svc),
        }
        .layered(settings)
    }

    /// Wraps both endpoints in the middleware stack from `settings`.
    ///
    /// Each call creates fresh rate limiter buckets and breaker circuits.
    pub fn layered(self, settings: &EndpointSettings) -> Self {
        Self {
            sum: settings
                .builder("Sum", settings.sum_limit)
                .build(self.sum),
            concat: settings
                .builder("Concat", settings.concat_limit)
                .build(self.concat),
        }
    }
}

impl fmt::Debug for Endpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoints").finish_non_exhaustive()
    }
}

impl AddService for Endpoints {
    fn sum(&self, ctx: Context, a: i64, b: i64) -> BoxFuture<'_, Result<i64, KitError>> {
        let endpoint = self.sum.clone();
        Box::pin(async move {
            let response = endpoint
                .oneshot(Invocation::with_context(ctx, SumRequest { a, b }))
                .await?;
            match response.failed() {
                Some(err) => Err(err),
                None => Ok(response.v),
            }
        })
    }

    fn concat(&self, ctx: Context, a: String, b: String) -> BoxFuture<'_, Result<String, KitError>> {
        let endpoint = self.concat.clone();
        Box::pin(async move {
            let response = endpoint
                .oneshot(Invocation::with_context(ctx, ConcatRequest { a, b }))
                .await?;
            match response.failed() {
                Some(err) => Err(err),
                None => Ok(response.v),
            }
        })
    }
}
