//! Routing and transport behaviour of the boundary adapter.

use std::sync::Arc;

use crate::test_helpers::{
    Fault, FaultyBackend, GatedBackend, ORIGIN, SIGNING_KEY, register, seeded_liaison, session,
};
use credential_liaison::boundary::{
    BoundaryAdapter, BoundaryEnvelope, DispatchMessage, DispatchReply, FALLBACK_REPLY,
};
use credential_liaison::manager::services::Liaison;
use credential_liaison::request::domain::{ErrorCode, NormalizedError};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tokio::sync::mpsc;

#[fixture]
fn liaison() -> Arc<Liaison> {
    Arc::new(seeded_liaison())
}

fn signing_key_message(backend_id: &str) -> DispatchMessage {
    DispatchMessage::new(backend_id, "manager", "getSigningKey", session())
        .with_args([json!(ORIGIN)])
}

fn rejection_code(reply: &DispatchReply) -> Option<ErrorCode> {
    match reply {
        DispatchReply::Rejected { error } => Some(error.code()),
        DispatchReply::Resolved { .. } => None,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dispatch_resolves_through_the_builtin(liaison: Arc<Liaison>) {
    let adapter = BoundaryAdapter::new(liaison);

    let reply = adapter.dispatch(signing_key_message("builtin")).await;

    assert_eq!(
        reply,
        DispatchReply::Resolved {
            value: json!(SIGNING_KEY)
        }
    );
}

#[rstest]
#[case::empty_backend(DispatchMessage::new("", "manager", "getSigningKey", session()))]
#[case::unknown_backend(DispatchMessage::new("nowhere", "manager", "getSigningKey", session()))]
#[case::unknown_group(DispatchMessage::new("slow", "vault", "getSigningKey", session()))]
#[case::group_not_provided(DispatchMessage::new("slow", "login", "getRecordMetadata", session()))]
#[case::unknown_method(DispatchMessage::new("slow", "manager", "getEverything", session()))]
#[case::method_of_another_group(DispatchMessage::new("slow", "manager", "getFields", session()))]
#[case::wrong_argument_type(
    DispatchMessage::new("slow", "manager", "getSigningKey", session()).with_args([json!(42)])
)]
#[case::missing_argument(DispatchMessage::new("slow", "manager", "getSigningKey", session()))]
#[tokio::test(flavor = "multi_thread")]
async fn unroutable_or_invalid_messages_never_reach_the_backend(
    liaison: Arc<Liaison>,
    #[case] message: DispatchMessage,
) {
    let backend = GatedBackend::new();
    register(&liaison, "slow", backend.clone());
    let adapter = BoundaryAdapter::new(liaison);

    let reply = adapter.dispatch(message).await;

    assert_eq!(rejection_code(&reply), Some(ErrorCode::ValidationFailure));
    assert_eq!(backend.calls(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn opaque_backend_rejection_becomes_transport_failure(liaison: Arc<Liaison>) {
    register(&liaison, "opaque", FaultyBackend::new(Fault::OpaqueRejection));
    let adapter = BoundaryAdapter::new(liaison);

    let reply = adapter.dispatch(signing_key_message("opaque")).await;

    assert_eq!(
        reply,
        DispatchReply::rejected(NormalizedError::transport_failure())
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn backend_fault_crosses_as_unexpected_exception(liaison: Arc<Liaison>) {
    register(&liaison, "faulty", FaultyBackend::new(Fault::Error));
    let adapter = BoundaryAdapter::new(liaison);

    let reply = adapter.dispatch(signing_key_message("faulty")).await;

    assert_eq!(
        reply,
        DispatchReply::rejected(NormalizedError::unexpected_exception())
    );
}

#[rstest]
#[case::not_json(b"not json".to_vec())]
#[case::missing_routing(br#"{"group":"manager"}"#.to_vec())]
#[case::args_not_a_list(
    br#"{"backendId":"builtin","group":"manager","method":"getSigningKey","requestContext":{"sessionId":"s"},"requestArgs":"x"}"#.to_vec()
)]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_payload_yields_transport_failure(
    liaison: Arc<Liaison>,
    #[case] payload: Vec<u8>,
) {
    let adapter = BoundaryAdapter::new(liaison);

    let encoded = adapter.dispatch_encoded(&payload).await;
    let reply: DispatchReply =
        serde_json::from_slice(&encoded).expect("reply should always decode");

    assert_eq!(reply, DispatchReply::rejected(NormalizedError::transport_failure()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn encoded_reply_has_the_documented_shape(liaison: Arc<Liaison>) {
    let adapter = BoundaryAdapter::new(liaison);
    let payload = serde_json::to_vec(&signing_key_message("builtin"))
        .expect("message should encode");

    let encoded = adapter.dispatch_encoded(&payload).await;
    let reply: Value = serde_json::from_slice(&encoded).expect("reply should be JSON");

    assert_eq!(reply, json!({ "status": "resolved", "value": SIGNING_KEY }));
}

#[rstest]
fn fallback_reply_decodes_to_transport_failure() {
    let reply: DispatchReply =
        serde_json::from_slice(FALLBACK_REPLY).expect("fallback should decode");

    assert_eq!(reply, DispatchReply::rejected(NormalizedError::transport_failure()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn serve_answers_every_envelope_and_stops_when_inbox_closes(liaison: Arc<Liaison>) {
    let adapter = Arc::new(BoundaryAdapter::new(liaison));
    let (outbox, inbox) = mpsc::channel(4);
    let server = tokio::spawn(Arc::clone(&adapter).serve(inbox));

    let mut replies = Vec::new();
    for message in [signing_key_message("builtin"), signing_key_message("nowhere")] {
        let payload = serde_json::to_vec(&message).expect("message should encode");
        let (envelope, reply) = BoundaryEnvelope::new(payload);
        outbox.send(envelope).await.expect("server should be receiving");
        replies.push(reply);
    }
    drop(outbox);

    let mut decoded = Vec::new();
    for reply in replies {
        let bytes = reply.await.expect("every envelope should be answered");
        let parsed: DispatchReply = serde_json::from_slice(&bytes).expect("reply should decode");
        decoded.push(parsed);
    }
    server.await.expect("serve should finish once the inbox closes");

    assert!(decoded.first().is_some_and(DispatchReply::is_resolved));
    assert_eq!(
        decoded.get(1).and_then(rejection_code),
        Some(ErrorCode::ValidationFailure)
    );
}
