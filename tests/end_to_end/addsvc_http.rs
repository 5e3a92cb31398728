//! `/sum` and `/concat` through the full addsvc stack.

use super::test_utils::*;
use addsvc::EndpointSettings;
use axum::http::StatusCode;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn sum_returns_the_total() {
    let app = addsvc_app(&EndpointSettings::default(), None);

    let (status, body) = call(&app, "GET", "/sum", r#"{"a":1,"b":2}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"v": 3}));
}

#[tokio::test]
async fn two_empty_strings_are_a_bad_request() {
    let app = addsvc_app(&EndpointSettings::default(), None);

    let (status, body) = call(&app, "GET", "/concat", r#"{"a":"","b":""}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "two empty strings"}));
}

#[tokio::test]
async fn overflowing_sum_is_rejected_not_wrapped() {
    let app = addsvc_app(&unthrottled(), None);

    let (status, body) = call(&app, "GET", "/sum", r#"{"a":9223372036854775807,"b":1}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "integer overflow"}));

    let (status, body) = call(&app, "GET", "/sum", r#"{"a":-9223372036854775808,"b":-1}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "integer overflow"}));
}

#[tokio::test]
async fn concat_is_verbatim() {
    let app = addsvc_app(&unthrottled(), None);

    let (status, body) = call(&app, "GET", "/concat", r#"{"a":" a","b":"🍔 "}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"v": " a🍔 "}));

    let (_, body) = call(&app, "GET", "/concat", r#"{"a":"","b":"x"}"#).await;
    assert_eq!(body, json!({"v": "x"}));
}

#[tokio::test]
async fn any_method_is_accepted() {
    let app = addsvc_app(&unthrottled(), None);

    for method in ["GET", "POST", "PUT"] {
        let (status, body) = call(&app, method, "/sum", r#"{"a":20,"b":22}"#).await;
        assert_eq!(status, StatusCode::OK, "method {method}");
        assert_eq!(body, json!({"v": 42}));
    }
}

#[tokio::test]
async fn malformed_payloads_are_bad_requests() {
    let app = addsvc_app(&unthrottled(), None);

    for payload in [r#"{"a":1,"b":"#, r#"{"a":"one","b":2}"#, r#"{"a":1}"#, ""] {
        let (status, body) = call(&app, "GET", "/sum", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload:?}");
        assert!(body["error"].is_string(), "payload {payload:?} gave {body}");
    }
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let app = addsvc_app(&unthrottled(), None);

    let (status, _) = call(&app, "GET", "/multiply", r#"{"a":1,"b":2}"#).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repeated_requests_give_the_same_answer() {
    let app = addsvc_app(&unthrottled(), None);

    for _ in 0..5 {
        let (status, body) = call(&app, "GET", "/concat", r#"{"a":"foo","b":"bar"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"v": "foobar"}));

        let (status, body) = call(&app, "GET", "/concat", r#"{"a":"","b":""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "two empty strings"}));
    }
}

#[tokio::test(start_paused = true)]
async fn default_sum_limit_is_one_per_second() {
    let app = addsvc_app(&EndpointSettings::default(), None);

    let (status, _) = call(&app, "GET", "/sum", r#"{"a":1,"b":1}"#).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, "GET", "/sum", r#"{"a":1,"b":1}"#).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({"error": "rate limit exceeded"}));

    tokio::time::advance(Duration::from_secs(1)).await;

    let (status, body) = call(&app, "GET", "/sum", r#"{"a":1,"b":1}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"v": 2}));
}

#[tokio::test(start_paused = true)]
async fn sum_and_concat_have_separate_buckets() {
    let app = addsvc_app(&EndpointSettings::default(), None);

    call(&app, "GET", "/sum", r#"{"a":1,"b":1}"#).await;
    let (status, _) = call(&app, "GET", "/sum", r#"{"a":1,"b":1}"#).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    for _ in 0..100 {
        let (status, _) = call(&app, "GET", "/concat", r#"{"a":"a","b":"b"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = call(&app, "GET", "/concat", r#"{"a":"a","b":"b"}"#).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn expired_request_timeout_is_reported_as_canceled() {
    let app = addsvc_app(&unthrottled(), None);

    let (status, body) = call_with_headers(
        &app,
        "GET",
        "/sum",
        r#"{"a":1,"b":2}"#,
        &[("x-request-timeout-ms", "0")],
    )
    .await;

    assert_eq!(status.as_u16(), 499);
    assert_eq!(body, json!({"error": "deadline exceeded"}));
}

#[tokio::test]
async fn generous_request_timeout_changes_nothing() {
    let app = addsvc_app(&unthrottled(), None);

    let (status, body) = call_with_headers(
        &app,
        "GET",
        "/sum",
        r#"{"a":1,"b":2}"#,
        &[("x-request-timeout-ms", "60000")],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"v": 3}));
}

#[tokio::test]
async fn max_concat_len_counts_characters() {
    let svc = addsvc::new_service(Some(4), None, None);
    let app = addsvc::http::router(addsvc::Endpoints::new(svc, &unthrottled()));

    let (status, body) = call(&app, "GET", "/concat", r#"{"a":"🍔🍔","b":"🍔🍔"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"v": "🍔🍔🍔🍔"}));

    let (status, body) = call(&app, "GET", "/concat", r#"{"a":"abc","b":"de"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "result exceeds maximum size"}));
}

#[tokio::test(start_paused = true)]
async fn vanishing_refill_rate_throttles_without_failing() {
    let mut settings = EndpointSettings::default();
    settings.sum_limit.per_second = 1e-20;
    let app = addsvc_app(&settings, None);

    let (status, _) = call(&app, "GET", "/sum", r#"{"a":1,"b":1}"#).await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..3 {
        let (status, body) = call(&app, "GET", "/sum", r#"{"a":1,"b":1}"#).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, json!({"error": "rate limit exceeded"}));
    }
}
