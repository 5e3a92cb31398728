//! Rate limiter metrics regression tests

use super::helpers::*;
use serial_test::serial;

use tower::{Layer, ServiceExt};
use tower_kit::core::{Invocation, KitError};
use tower_kit::ratelimiter::RateLimiterConfig;

#[tokio::test(start_paused = true)]
#[serial]
async fn ratelimiter_metrics_exist() {
    init_recorder();

    let service = RateLimiterConfig::builder()
        .name("regression_limiter")
        .capacity(2)
        .refill_per_second(0.01)
        .build()
        .layer(tower::service_fn(|inv: Invocation<u32>| async move {
            Ok::<_, KitError>(inv.request)
        }));

    for i in 0..3 {
        let _ = service.clone().oneshot(Invocation::new(i)).await;
    }

    let counters = counters();
    assert_eq!(
        counter_value(
            &counters,
            "ratelimiter_calls_total",
            &[("ratelimiter", "regression_limiter"), ("result", "permitted")]
        ),
        Some(2)
    );
    assert_eq!(
        counter_value(
            &counters,
            "ratelimiter_calls_total",
            &[("ratelimiter", "regression_limiter"), ("result", "rejected")]
        ),
        Some(1)
    );

    assert_counter_exists("ratelimiter_calls_total");
    assert_metric_has_label("ratelimiter_calls_total", "ratelimiter", "regression_limiter");
    assert_metric_has_label("ratelimiter_calls_total", "result", "permitted");
    assert_metric_has_label("ratelimiter_calls_total", "result", "rejected");

    assert_histogram_exists("ratelimiter_wait_duration_seconds");
    assert_metric_has_label(
        "ratelimiter_wait_duration_seconds",
        "ratelimiter",
        "regression_limiter",
    );
}

#[tokio::test]
#[serial]
async fn cancelled_waits_are_counted_separately() {
    init_recorder();

    let service = RateLimiterConfig::builder()
        .name("regression_canceled")
        .capacity(1)
        .refill_per_second(1.0)
        .build()
        .layer(tower::service_fn(|inv: Invocation<u32>| async move {
            Ok::<_, KitError>(inv.request)
        }));

    let ctx = tower_kit::core::Context::new();
    ctx.cancel();
    let _ = service.oneshot(Invocation::with_context(ctx, 1)).await;

    let counters = counters();
    assert_eq!(
        counter_value(
            &counters,
            "ratelimiter_calls_total",
            &[("ratelimiter", "regression_canceled"), ("result", "canceled")]
        ),
        Some(1)
    );
    assert_metric_has_label("ratelimiter_calls_total", "result", "canceled");
}
