//! Sequencing guarantees observed through the public façade.

use std::time::Duration;

use crate::test_helpers::{
    GATED_CREDENTIAL_COUNT, GET_CREDENTIALS_METADATA, GET_SIGNING_KEY, GatedBackend, ORIGIN,
    register, seeded_liaison, session,
};
use credential_liaison::request::domain::{ErrorCode, NormalizedError};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_request_while_pending_is_rejected() {
    let liaison = seeded_liaison();
    let backend = GatedBackend::new();
    register(&liaison, "slow", backend.clone());
    let facade = liaison.get_request_handler("slow").expect("backend is registered");

    let first = tokio::spawn({
        let pending = facade.clone();
        async move { pending.invoke(session(), GET_SIGNING_KEY, vec![json!(ORIGIN)]).await }
    });
    backend.entered().await;

    let second = facade
        .invoke(session(), GET_SIGNING_KEY, vec![json!(ORIGIN)])
        .await
        .expect_err("second request should be rejected");

    assert_eq!(
        second.as_normalized(),
        Some(&NormalizedError::sequencing_violation())
    );
    assert!(second.code().is_retryable());
    assert_eq!(backend.calls(), 1);

    backend.release();
    let value = first
        .await
        .expect("first request task should finish")
        .expect("first request should resolve");
    assert_eq!(value, json!(format!("gated:{ORIGIN}")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn busy_flag_clears_before_caller_observes_outcome() {
    let liaison = seeded_liaison();
    let backend = GatedBackend::new();
    register(&liaison, "slow", backend.clone());
    let facade = liaison.get_request_handler("slow").expect("backend is registered");

    backend.release();
    facade
        .invoke(session(), GET_SIGNING_KEY, vec![json!(ORIGIN)])
        .await
        .expect("request should resolve");

    assert!(!facade.is_busy());
    backend.release();
    facade
        .invoke(session(), GET_SIGNING_KEY, vec![json!(ORIGIN)])
        .await
        .expect("follow-up request should be accepted immediately");
    assert_eq!(backend.calls(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn caller_timeout_does_not_release_the_backend() {
    let liaison = seeded_liaison();
    let backend = GatedBackend::new();
    register(&liaison, "slow", backend.clone());
    let facade = liaison.get_request_handler("slow").expect("backend is registered");

    let waited = tokio::time::timeout(
        Duration::from_millis(20),
        facade.invoke(session(), GET_SIGNING_KEY, vec![json!(ORIGIN)]),
    )
    .await;

    assert!(waited.is_err(), "request should still be pending");
    backend.entered().await;
    assert!(facade.is_busy());
    let rejected = facade
        .invoke(session(), GET_SIGNING_KEY, vec![json!(ORIGIN)])
        .await
        .expect_err("backend should still be busy");
    assert_eq!(rejected.code(), ErrorCode::SequencingViolation);

    backend.release();
    backend.completed().await;
    assert!(!facade.is_busy());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn different_backends_proceed_independently() {
    let liaison = seeded_liaison();
    let backend = GatedBackend::new();
    register(&liaison, "slow", backend.clone());
    let slow = liaison.get_request_handler("slow").expect("backend is registered");
    let builtin = liaison
        .get_request_handler("builtin")
        .expect("builtin is registered");

    let pending = tokio::spawn({
        let held = slow.clone();
        async move { held.invoke(session(), GET_SIGNING_KEY, vec![json!(ORIGIN)]).await }
    });
    backend.entered().await;

    let value = builtin
        .invoke(session(), GET_SIGNING_KEY, vec![json!(ORIGIN)])
        .await
        .expect("builtin should not be blocked by another backend");

    assert_eq!(value, json!("key-1"));
    assert!(slow.is_busy());
    backend.release();
    pending
        .await
        .expect("pending task should finish")
        .expect("pending request should resolve");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn handlers_for_one_backend_share_the_busy_flag() {
    let liaison = seeded_liaison();
    let backend = GatedBackend::new();
    register(&liaison, "slow", backend.clone());
    let first = liaison.get_request_handler("slow").expect("backend is registered");
    let second = liaison.get_request_handler("slow").expect("backend is registered");

    let pending = tokio::spawn(async move {
        first
            .invoke(session(), GET_SIGNING_KEY, vec![json!(ORIGIN)])
            .await
    });
    backend.entered().await;

    let rejected = second
        .invoke(session(), GET_SIGNING_KEY, vec![json!(ORIGIN)])
        .await
        .expect_err("shared pipeline should be busy");

    assert_eq!(rejected.code(), ErrorCode::SequencingViolation);
    backend.release();
    pending
        .await
        .expect("pending task should finish")
        .expect("pending request should resolve");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn backend_accepts_requests_again_after_a_violation() {
    let liaison = seeded_liaison();
    let backend = GatedBackend::new();
    register(&liaison, "slow", backend.clone());
    let facade = liaison.get_request_handler("slow").expect("backend is registered");
    let first = tokio::spawn({
        let pending = facade.clone();
        async move {
            pending
                .invoke(session(), GET_CREDENTIALS_METADATA, vec![json!(ORIGIN)])
                .await
        }
    });
    backend.entered().await;

    let second = facade
        .invoke(session(), GET_CREDENTIALS_METADATA, vec![json!(ORIGIN)])
        .await
        .expect_err("second request should be rejected");
    assert_eq!(
        second.as_normalized(),
        Some(&NormalizedError::sequencing_violation())
    );

    backend.release();
    let first_value = first
        .await
        .expect("first request task should finish")
        .expect("first request should resolve");
    assert_eq!(first_value, json!(GATED_CREDENTIAL_COUNT));
    assert!(!facade.is_busy());

    backend.release();
    let third_value = facade
        .invoke(session(), GET_CREDENTIALS_METADATA, vec![json!(ORIGIN)])
        .await
        .expect("third request should resolve");

    assert_eq!(third_value, json!(GATED_CREDENTIAL_COUNT));
    assert_eq!(backend.calls(), 2);
}
