//! Endpoint instrumentation metrics regression tests

use super::helpers::*;
use serial_test::serial;

use addsvc::{AddService, EndpointSettings, Endpoints};
use std::sync::Arc;
use tower::ServiceExt;
use tower_kit::core::{Context, Invocation, KitError, MetricsFacade};
use tower_kit::endpoint::{EndpointBuilder, InstrumentingLayer, endpoint_fn};

#[tokio::test]
#[serial]
async fn instrumenting_metrics_exist() {
    init_recorder();

    let endpoint = EndpointBuilder::new()
        .layer(InstrumentingLayer::new(
            "Regression",
            Some(Arc::new(MetricsFacade::new())),
        ))
        .build(endpoint_fn(|_ctx: Context, n: u32| async move {
            if n % 2 == 0 {
                Ok(n)
            } else {
                Err(KitError::internal("odd"))
            }
        }));

    for n in 0..3 {
        let _ = endpoint.clone().oneshot(Invocation::new(n)).await;
    }

    let counters = counters();
    assert_eq!(
        counter_value(
            &counters,
            "request_count",
            &[("method", "Regression"), ("success", "true")]
        ),
        Some(2)
    );
    assert_eq!(
        counter_value(
            &counters,
            "request_count",
            &[("method", "Regression"), ("success", "false")]
        ),
        Some(1)
    );

    assert_counter_exists("request_count");
    assert_metric_has_label("request_count", "method", "Regression");

    assert_histogram_exists("request_duration_seconds");
    assert_metric_has_label("request_duration_seconds", "method", "Regression");
    assert_metric_has_label("request_duration_seconds", "success", "false");
}

#[tokio::test]
#[serial]
async fn facade_prefix_is_prepended() {
    init_recorder();

    let endpoint = EndpointBuilder::new()
        .layer(InstrumentingLayer::new(
            "Prefixed",
            Some(Arc::new(MetricsFacade::with_prefix("kit"))),
        ))
        .build(endpoint_fn(|_ctx: Context, n: u32| async move {
            Ok::<_, KitError>(n)
        }));

    endpoint.oneshot(Invocation::new(1)).await.unwrap();

    assert_counter_exists("kit_request_count");
    assert_histogram_exists("kit_request_duration_seconds");
    assert_metric_has_label("kit_request_count", "method", "Prefixed");
}

#[tokio::test]
#[serial]
async fn addsvc_endpoint_stack_emits_every_layer() {
    init_recorder();

    let settings = EndpointSettings::default().with_recorder(Arc::new(MetricsFacade::new()));
    let endpoints = Endpoints::new(Arc::new(addsvc::BasicService::new()), &settings);

    endpoints.sum(Context::new(), 1, 2).await.unwrap();
    let _ = endpoints.sum(Context::new(), 1, 2).await;
    endpoints
        .concat(Context::new(), "a".into(), "b".into())
        .await
        .unwrap();

    assert_metric_has_label("request_count", "method", "Sum");
    assert_metric_has_label("request_count", "method", "Concat");
    assert_metric_has_label("request_duration_seconds", "method", "Sum");

    assert_metric_has_label("ratelimiter_calls_total", "ratelimiter", "sum");
    assert_metric_has_label("ratelimiter_calls_total", "ratelimiter", "concat");
    assert_metric_has_label("circuitbreaker_calls_total", "circuitbreaker", "sum");
    assert_metric_has_label("circuitbreaker_calls_total", "circuitbreaker", "concat");
}
