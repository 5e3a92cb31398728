//! Order verification tests.

use super::test_utils::*;
use addsvc::{AddService, BasicService};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::ServiceExt;
use tower_kit::circuitbreaker::CircuitBreakerConfig;
use tower_kit::core::{Chain, Context, ErrorKind, Invocation};
use tower_kit::endpoint::EndpointBuilder;
use tower_kit::ratelimiter::RateLimiterConfig;

#[tokio::test]
async fn first_service_middleware_runs_outermost() {
    let trail = trail();
    let svc: Arc<dyn AddService> = Chain::new()
        .with(tagged_service("outer", &trail))
        .with(tagged_service("middle", &trail))
        .with(tagged_service("inner", &trail))
        .build(Arc::new(BasicService::new()));

    assert_eq!(svc.sum(Context::new(), 1, 2).await.unwrap(), 3);
    assert_eq!(
        entries(&trail),
        ["outer>", "middle>", "inner>", "<inner", "<middle", "<outer"]
    );
}

#[tokio::test]
async fn first_endpoint_middleware_runs_outermost() {
    let trail = trail();
    let calls = Arc::new(AtomicUsize::new(0));
    let endpoint = EndpointBuilder::new()
        .middleware(tagged_endpoint("a", &trail))
        .middleware(tagged_endpoint("b", &trail))
        .build(counting_endpoint(&calls));

    assert_eq!(endpoint.oneshot(Invocation::new(7)).await.unwrap(), 7);
    assert_eq!(entries(&trail), ["a>", "b>", "<b", "<a"]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn one_chain_wraps_many_services_identically() {
    let trail = trail();
    let chain = Chain::new()
        .with(tagged_service("x", &trail))
        .with(tagged_service("y", &trail));

    let first = chain.build(Arc::new(BasicService::new()));
    let second = chain.build(Arc::new(BasicService::new()));

    first.sum(Context::new(), 1, 1).await.unwrap();
    second.sum(Context::new(), 2, 2).await.unwrap();

    assert_eq!(
        entries(&trail),
        ["x>", "y>", "<y", "<x", "x>", "y>", "<y", "<x"]
    );
}

#[tokio::test(start_paused = true)]
async fn breaker_outside_limiter_counts_rejections_with_default_classifier() {
    let calls = Arc::new(AtomicUsize::new(0));
    let endpoint = EndpointBuilder::new()
        .layer(
            CircuitBreakerConfig::builder()
                .failure_threshold(2)
                .wait_duration_in_open(Duration::from_secs(30))
                .build(),
        )
        .layer(
            RateLimiterConfig::builder()
                .capacity(1)
                .refill_per_second(0.01)
                .build(),
        )
        .build(counting_endpoint(&calls));

    let kinds = run(&endpoint, 4).await;

    assert_eq!(
        kinds,
        [
            None,
            Some(ErrorKind::RateLimited),
            Some(ErrorKind::RateLimited),
            Some(ErrorKind::CircuitOpen),
        ]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn limiter_outside_breaker_keeps_rejections_away_from_it() {
    let calls = Arc::new(AtomicUsize::new(0));
    let endpoint = EndpointBuilder::new()
        .layer(
            RateLimiterConfig::builder()
                .capacity(1)
                .refill_per_second(0.01)
                .build(),
        )
        .layer(
            CircuitBreakerConfig::builder()
                .failure_threshold(2)
                .wait_duration_in_open(Duration::from_secs(30))
                .build(),
        )
        .build(counting_endpoint(&calls));

    let kinds = run(&endpoint, 4).await;

    assert_eq!(
        kinds,
        [
            None,
            Some(ErrorKind::RateLimited),
            Some(ErrorKind::RateLimited),
            Some(ErrorKind::RateLimited),
        ]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

async fn run(endpoint: &tower_kit::endpoint::Endpoint<u32, u32>, n: u32) -> Vec<Option<ErrorKind>> {
    let mut kinds = Vec::new();
    for i in 0..n {
        let result = endpoint.clone().oneshot(Invocation::new(i)).await;
        kinds.push(result.err().map(|err| err.kind()));
    }
    kinds
}
