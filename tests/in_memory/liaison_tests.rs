//! Registry behaviour while requests are in flight.

use std::sync::Arc;
use std::thread;

use crate::test_helpers::{GET_SIGNING_KEY, GatedBackend, ORIGIN, register, seeded_liaison, session};
use credential_liaison::manager::{
    adapters::memory::InMemoryCredentialBackend,
    services::{LiaisonError, RegisterManagerRequest},
};
use credential_liaison::request::domain::ErrorCode;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn erasing_a_busy_backend_lets_its_request_finish() {
    let liaison = seeded_liaison();
    let backend = GatedBackend::new();
    register(&liaison, "slow", backend.clone());
    let facade = liaison.get_request_handler("slow").expect("backend is registered");
    let pending = tokio::spawn({
        let held = facade.clone();
        async move { held.invoke(session(), GET_SIGNING_KEY, vec![json!(ORIGIN)]).await }
    });
    backend.entered().await;

    liaison.erase_manager("slow").expect("erase should succeed");
    backend.release();
    let value = pending
        .await
        .expect("pending task should finish")
        .expect("in-flight request should still resolve");

    assert_eq!(value, json!(format!("gated:{ORIGIN}")));
    assert!(matches!(
        liaison.get_request_handler("slow"),
        Err(LiaisonError::NotFound(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_registration_keeps_the_original_pipeline() {
    let liaison = seeded_liaison();
    let backend = GatedBackend::new();
    register(&liaison, "slow", backend.clone());
    let before = liaison.get_request_handler("slow").expect("backend is registered");
    let pending = tokio::spawn({
        let held = before.clone();
        async move { held.invoke(session(), GET_SIGNING_KEY, vec![json!(ORIGIN)]).await }
    });
    backend.entered().await;

    let duplicate = liaison.register_manager(
        RegisterManagerRequest::external("slow", "Replacement"),
        Arc::new(InMemoryCredentialBackend::new()),
    );
    let after = liaison.get_request_handler("slow").expect("backend is registered");
    let rejected = after
        .invoke(session(), GET_SIGNING_KEY, vec![json!(ORIGIN)])
        .await
        .expect_err("original pipeline should still be busy");

    assert!(matches!(duplicate, Err(LiaisonError::Duplicate(_))));
    assert!(after.is_busy());
    assert_eq!(rejected.code(), ErrorCode::SequencingViolation);
    backend.release();
    let value = pending
        .await
        .expect("pending task should finish")
        .expect("pending request should resolve");
    assert_eq!(value, json!(format!("gated:{ORIGIN}")));
    assert!(!before.is_busy());
    assert!(!after.is_busy());
    assert_eq!(backend.calls(), 1);
}

#[rstest]
fn concurrent_registrations_are_all_recorded() {
    let liaison = Arc::new(seeded_liaison());

    thread::scope(|scope| {
        for index in 0..8 {
            let registry = Arc::clone(&liaison);
            scope.spawn(move || {
                registry
                    .register_manager(
                        RegisterManagerRequest::external(format!("ext-{index}"), "Extension"),
                        Arc::new(InMemoryCredentialBackend::new()),
                    )
                    .expect("distinct ids should register");
            });
        }
    });

    assert_eq!(liaison.managers().len(), 9);
}

#[rstest]
fn concurrent_duplicate_registration_admits_one() {
    let liaison = Arc::new(seeded_liaison());

    let outcomes: Vec<bool> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&liaison);
                scope.spawn(move || {
                    registry
                        .register_manager(
                            RegisterManagerRequest::external("contested", "Contested"),
                            Arc::new(InMemoryCredentialBackend::new()),
                        )
                        .is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("registration thread should not panic"))
            .collect()
    });

    assert_eq!(outcomes.iter().filter(|admitted| **admitted).count(), 1);
    assert_eq!(liaison.managers().len(), 2);
}
