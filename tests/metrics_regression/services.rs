//! Service-level business metrics regression tests

use super::helpers::*;
use serial_test::serial;

use addsvc::AddService;
use std::sync::Arc;
use stringsvc::StringService;
use tower_kit::core::{Context, MetricsFacade};

#[tokio::test]
#[serial]
async fn addsvc_business_counters() {
    init_recorder();

    let svc = addsvc::new_service(None, Some(Arc::new(MetricsFacade::new())), None);

    svc.sum(Context::new(), 1, 2).await.unwrap();
    svc.sum(Context::new(), 3, 4).await.unwrap();
    svc.sum(Context::new(), i64::MAX, 1).await.unwrap_err();
    svc.concat(Context::new(), "ab".into(), "🍔".into()).await.unwrap();
    svc.concat(Context::new(), String::new(), String::new())
        .await
        .unwrap_err();

    // Two integers per successful sum, characters of successful concats.
    let counters = counters();
    assert_eq!(counter_value(&counters, "addsvc_integers_summed", &[]), Some(4));
    assert_eq!(
        counter_value(&counters, "addsvc_characters_concatenated", &[]),
        Some(3)
    );

    assert_counter_exists("addsvc_integers_summed");
    assert_counter_exists("addsvc_characters_concatenated");
}

#[tokio::test]
#[serial]
async fn stringsvc_request_metrics() {
    init_recorder();

    let svc = stringsvc::new_service(Some(Arc::new(MetricsFacade::new())));

    svc.uppercase(Context::new(), "blep".into()).await.unwrap();
    svc.uppercase(Context::new(), String::new()).await.unwrap_err();
    svc.count(Context::new(), "🍔🍔".into()).await.unwrap();

    let counters = counters();
    assert_eq!(
        counter_value(
            &counters,
            "stringsvc_request_count",
            &[("method", "uppercase"), ("error", "true")]
        ),
        Some(1)
    );
    assert_eq!(
        counter_value(
            &counters,
            "stringsvc_request_count",
            &[("method", "count"), ("error", "false")]
        ),
        Some(1)
    );

    assert_counter_exists("stringsvc_request_count");
    assert_metric_has_label("stringsvc_request_count", "method", "uppercase");
    assert_metric_has_label("stringsvc_request_count", "error", "false");

    assert_histogram_exists("stringsvc_request_latency_seconds");
    assert_metric_has_label("stringsvc_request_latency_seconds", "method", "count");
    assert_histogram_exists("stringsvc_count_result");
}
