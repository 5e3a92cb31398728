//! HTTP clients, and addsvc calling stringsvc to post-process concat results.

use super::test_utils::*;
use addsvc::{AddService, EndpointSettings};
use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use stringsvc::StringService;
use tower_kit::core::{Context, ErrorKind};

#[tokio::test]
async fn addsvc_client_round_trip() {
    let addr = serve(addsvc_app(&unthrottled(), None)).await;
    let remote = addsvc::http::client(&addr.to_string()).unwrap();

    assert_eq!(remote.sum(Context::new(), 40, 2).await.unwrap(), 42);
    assert_eq!(
        remote
            .concat(Context::new(), "foo".into(), "bar".into())
            .await
            .unwrap(),
        "foobar"
    );
}

#[tokio::test]
async fn business_errors_survive_the_wire() {
    let addr = serve(addsvc_app(&unthrottled(), None)).await;
    let remote = addsvc::http::client(&addr.to_string()).unwrap();

    let err = remote.sum(Context::new(), i64::MAX, 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.message(), "integer overflow");

    let err = remote
        .concat(Context::new(), String::new(), String::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.message(), "two empty strings");
}

#[tokio::test]
async fn server_throttling_reaches_the_client() {
    let addr = serve(addsvc_app(&EndpointSettings::default(), None)).await;
    let remote = addsvc::http::client(&addr.to_string()).unwrap();

    remote.sum(Context::new(), 1, 1).await.unwrap();
    let err = remote.sum(Context::new(), 1, 1).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert!(err.is_rate_limited());
}

#[tokio::test]
async fn client_side_limiter_rejects_before_sending() {
    let addr = serve(addsvc_app(&unthrottled(), None)).await;
    let remote = addsvc::http::client(&addr.to_string())
        .unwrap()
        .layered(&EndpointSettings::default());

    remote.sum(Context::new(), 1, 1).await.unwrap();
    let err = remote.sum(Context::new(), 1, 1).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RateLimited);
}

#[tokio::test]
async fn client_side_breaker_opens_on_an_unreachable_server() {
    let addr = dead_addr().await;
    let settings = EndpointSettings {
        failure_threshold: 2,
        ..unthrottled()
    };
    let remote = addsvc::http::client(&addr.to_string())
        .unwrap()
        .layered(&settings);

    for _ in 0..2 {
        let err = remote.sum(Context::new(), 1, 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    let err = remote.sum(Context::new(), 1, 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CircuitOpen);

    // The concat breaker is separate and still closed.
    let err = remote
        .concat(Context::new(), "a".into(), "b".into())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[tokio::test]
async fn stringsvc_client_round_trip() {
    let addr = serve(stringsvc_app()).await;
    let remote = stringsvc::http::client(&addr.to_string()).unwrap();

    assert_eq!(
        remote.uppercase(Context::new(), "blep".into()).await.unwrap(),
        "BLEP"
    );
    assert_eq!(remote.count(Context::new(), "🍔🍔🍔".into()).await.unwrap(), 3);

    let err = remote
        .uppercase(Context::new(), String::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.message(), "empty string");
}

#[tokio::test]
async fn concat_results_are_uppercased_remotely() {
    let strings = serve(stringsvc_app()).await;
    let remote: Arc<dyn StringService> =
        Arc::new(stringsvc::http::client(&strings.to_string()).unwrap());
    let app = addsvc_app(&unthrottled(), Some(remote));

    let (status, body) = call(&app, "GET", "/concat", r#"{"a":"foo","b":"bar"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"v": "FOOBAR"}));

    // Sums are left alone.
    let (status, body) = call(&app, "GET", "/sum", r#"{"a":1,"b":2}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"v": 3}));
}

#[tokio::test]
async fn unreachable_string_service_leaves_concat_unchanged() {
    let strings = dead_addr().await;
    let remote: Arc<dyn StringService> =
        Arc::new(stringsvc::http::client(&strings.to_string()).unwrap());
    let app = addsvc_app(&unthrottled(), Some(remote));

    let (status, body) = call(&app, "GET", "/concat", r#"{"a":"foo","b":"bar"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"v": "foobar"}));
}

#[tokio::test]
async fn three_hops_client_to_addsvc_to_stringsvc() {
    let strings = serve(stringsvc_app()).await;
    let upper: Arc<dyn StringService> =
        Arc::new(stringsvc::http::client(&strings.to_string()).unwrap());
    let adds = serve(addsvc_app(&unthrottled(), Some(upper))).await;
    let remote = addsvc::http::client(&adds.to_string()).unwrap();

    let v = remote
        .concat(Context::new(), "hello, ".into(), "world".into())
        .await
        .unwrap();

    assert_eq!(v, "HELLO, WORLD");
}
