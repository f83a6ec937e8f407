use std::future::{poll_fn, Future};
use std::sync::Arc;
use std::task::Poll;
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::errors::{ErrorKind, MSG_CONFIGURATION, MSG_CONNECT, MSG_INCOMPLETE};
use crate::flows::{CareerGuidance, CareerRecommendations};
use crate::transport::scripted::{guidance_body, ScriptedReply, ScriptedTransport};

const BASE_URL: &str = "http://backend.test";

fn scripted(replies: impl IntoIterator<Item = ScriptedReply>) -> Arc<ScriptedTransport> {
    Arc::new(ScriptedTransport::new(replies))
}

fn guidance_controller(
    transport: &Arc<ScriptedTransport>,
) -> GuidanceRequestController<CareerGuidance> {
    GuidanceRequestController::new(transport.clone(), Some(BASE_URL.to_string()))
}

fn expected_guidance() -> CareerGuidance {
    serde_json::from_value(guidance_body()).unwrap()
}

fn failed(completion: Completion<CareerGuidance>) -> ErrorInfo {
    match completion {
        Completion::Settled(RequestState::Failed(error)) => error,
        other => panic!("expected a failed settlement, got {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_input_fails_validation_without_network_call() {
    let transport = scripted([]);
    let controller = guidance_controller(&transport);

    for input in ["", "   ", "\n\t"] {
        let error = failed(controller.submit(input).await);
        assert_eq!(error.kind, ErrorKind::Validation);
        assert!(!error.retryable);
    }

    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_length_bounds() {
    let transport = scripted([
        ScriptedReply::json(200, guidance_body()),
        ScriptedReply::json(200, guidance_body()),
    ]);
    let controller = guidance_controller(&transport);

    let too_short = failed(controller.submit("A").await);
    assert!(too_short.message.contains("at least 2 characters"));

    let too_long = failed(controller.submit(&"b".repeat(101)).await);
    assert!(too_long.message.contains("less than 100 characters"));
    assert_eq!(transport.call_count(), 0);

    let shortest = controller.submit("IT").await;
    assert!(matches!(shortest, Completion::Settled(RequestState::Succeeded(_))));

    let longest = controller.submit(&"c".repeat(100)).await;
    assert!(matches!(longest, Completion::Settled(RequestState::Succeeded(_))));
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_success_sends_trimmed_input_and_stores_payload() {
    let transport = scripted([ScriptedReply::json(200, guidance_body())]);
    let controller = guidance_controller(&transport);

    let completion = controller.submit("  Data Science  ").await;

    assert_eq!(
        completion,
        Completion::Settled(RequestState::Succeeded(expected_guidance()))
    );
    assert_eq!(controller.state().payload(), Some(&expected_guidance()));

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].url, "http://backend.test/career_guidance");
    assert_eq!(calls[0].body, json!({ "program": "Data Science" }));
    assert_eq!(controller.last_input().as_deref(), Some("Data Science"));
}

#[tokio::test]
async fn test_server_error_is_retryable() {
    let transport = scripted([ScriptedReply::status(500, "")]);
    let controller = guidance_controller(&transport);

    let error = failed(controller.submit("Economics").await);

    assert_eq!(error.kind, ErrorKind::Server);
    assert!(error.retryable);
}

#[tokio::test]
async fn test_partial_body_is_incomplete_data() {
    let transport = scripted([ScriptedReply::json(200, json!({ "keySkills": [] }))]);
    let controller = guidance_controller(&transport);

    let error = failed(controller.submit("Economics").await);

    assert_eq!(error.kind, ErrorKind::Server);
    assert!(error.retryable);
    assert!(error.message.contains("Incomplete"));
    assert_eq!(error.message, MSG_INCOMPLETE);
}

#[tokio::test]
async fn test_connect_failure_is_network_error() {
    let transport = scripted([ScriptedReply::error(TransportError::Connect(
        "connection refused".to_string(),
    ))]);
    let controller = guidance_controller(&transport);

    let error = failed(controller.submit("Economics").await);

    assert_eq!(error.kind, ErrorKind::Network);
    assert!(error.retryable);
    assert_eq!(error.message, MSG_CONNECT);
}

#[tokio::test]
async fn test_missing_base_url_fails_before_network() {
    let transport = scripted([ScriptedReply::json(200, guidance_body())]);
    let controller: GuidanceRequestController<CareerGuidance> =
        GuidanceRequestController::new(transport.clone(), None);

    let error = failed(controller.submit("Economics").await);

    assert_eq!(error.kind, ErrorKind::Unknown);
    assert!(!error.retryable);
    assert_eq!(error.message, MSG_CONFIGURATION);
    assert_eq!(transport.call_count(), 0);
    assert!(controller.retry().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_cancels_call_and_reports_network_error() {
    let transport = scripted([
        ScriptedReply::json(200, guidance_body()).after(Duration::from_secs(60)),
    ]);
    let controller = guidance_controller(&transport);

    let error = failed(controller.submit("Economics").await);

    assert_eq!(error.kind, ErrorKind::Network);
    assert!(error.retryable);
    assert!(error.message.contains("timed out"));
    assert_eq!(transport.cancelled_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_custom_timeout_is_respected() {
    let transport = scripted([
        ScriptedReply::json(200, guidance_body()).after(Duration::from_secs(5)),
    ]);
    let controller = guidance_controller(&transport).with_timeout(Duration::from_secs(10));

    let completion = controller.submit("Economics").await;

    assert_eq!(
        completion,
        Completion::Settled(RequestState::Succeeded(expected_guidance()))
    );
    assert_eq!(transport.cancelled_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_last_submit_wins() {
    let first_body = json!({
        "keySkills": ["Drafting"],
        "careerPaths": ["Architect"],
        "certifications": ["RIBA"],
        "industryTrends": ["Modular construction"]
    });
    let transport = scripted([
        ScriptedReply::json(200, first_body).after(Duration::from_secs(10)),
        ScriptedReply::json(200, guidance_body()),
    ]);
    let controller = Arc::new(guidance_controller(&transport));

    let first = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.submit("Architecture").await }
    });
    while transport.call_count() == 0 {
        tokio::task::yield_now().await;
    }
    assert!(controller.state().is_pending());

    let second = controller.submit("Data Science").await;

    assert_eq!(
        second,
        Completion::Settled(RequestState::Succeeded(expected_guidance()))
    );
    assert_eq!(first.await.unwrap(), Completion::Superseded);
    assert_eq!(transport.cancelled_count(), 1);

    tokio::time::advance(Duration::from_secs(20)).await;
    assert_eq!(
        controller.state(),
        RequestState::Succeeded(expected_guidance())
    );
    assert_eq!(controller.last_input().as_deref(), Some("Data Science"));
}

#[tokio::test]
async fn test_stale_response_that_beat_the_abort_is_discarded() {
    let first_body = json!({
        "keySkills": ["Drafting"],
        "careerPaths": ["Architect"],
        "certifications": ["RIBA"],
        "industryTrends": ["Modular construction"]
    });
    let transport = scripted([
        ScriptedReply::json(200, first_body),
        ScriptedReply::json(200, guidance_body()),
    ]);
    let controller = guidance_controller(&transport);

    // one poll runs the dispatch step and spawns the call
    let mut first = Box::pin(controller.submit("Architecture"));
    let first_pending = poll_fn(|cx| Poll::Ready(first.as_mut().poll(cx).is_pending())).await;
    assert!(first_pending);

    // the call resolves before the next submit gets a chance to abort it
    while transport.call_count() == 0 {
        tokio::task::yield_now().await;
    }

    let second = controller.submit("Data Science").await;

    assert_eq!(
        second,
        Completion::Settled(RequestState::Succeeded(expected_guidance()))
    );
    assert_eq!(first.await, Completion::Superseded);
    assert_eq!(transport.cancelled_count(), 0);
    assert_eq!(
        controller.state(),
        RequestState::Succeeded(expected_guidance())
    );
}

#[tokio::test(start_paused = true)]
async fn test_dropped_submit_aborts_call_and_resets_state() {
    let transport = scripted([
        ScriptedReply::json(200, guidance_body()).after(Duration::from_secs(60)),
        ScriptedReply::json(200, guidance_body()),
    ]);
    let controller = guidance_controller(&transport);

    let abandoned =
        tokio::time::timeout(Duration::from_secs(1), controller.submit("Economics")).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(transport.cancelled_count(), 1);
    assert_eq!(controller.state(), RequestState::Idle);
    assert!(controller.retry().await.is_none());

    let completion = controller.submit("Economics").await;
    assert_eq!(
        completion,
        Completion::Settled(RequestState::Succeeded(expected_guidance()))
    );
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_submit_still_supersedes_pending_call() {
    let transport = scripted([
        ScriptedReply::json(200, guidance_body()).after(Duration::from_secs(10)),
    ]);
    let controller = Arc::new(guidance_controller(&transport));

    let first = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.submit("Architecture").await }
    });
    while transport.call_count() == 0 {
        tokio::task::yield_now().await;
    }

    let error = failed(controller.submit(" ").await);

    assert_eq!(error.kind, ErrorKind::Validation);
    assert_eq!(first.await.unwrap(), Completion::Superseded);
    assert_eq!(controller.state().error().map(|e| e.kind), Some(ErrorKind::Validation));
}

#[tokio::test]
async fn test_retry_is_noop_when_idle() {
    let transport = scripted([]);
    let controller = guidance_controller(&transport);

    assert!(controller.retry().await.is_none());
    assert_eq!(controller.state(), RequestState::Idle);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_retry_is_noop_for_non_retryable_error() {
    let transport = scripted([ScriptedReply::json(
        400,
        json!({ "message": "Unknown program" }),
    )]);
    let controller = guidance_controller(&transport);

    let error = failed(controller.submit("Alchemy").await);
    assert_eq!(error.kind, ErrorKind::Validation);
    let before = controller.state();

    assert!(controller.retry().await.is_none());
    assert_eq!(controller.state(), before);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_retry_is_noop_after_success() {
    let transport = scripted([ScriptedReply::json(200, guidance_body())]);
    let controller = guidance_controller(&transport);

    controller.submit("Economics").await;

    assert!(controller.retry().await.is_none());
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_retry_resends_last_input() {
    let transport = scripted([
        ScriptedReply::status(503, ""),
        ScriptedReply::json(200, guidance_body()),
    ]);
    let controller = guidance_controller(&transport);

    let error = failed(controller.submit(" Economics ").await);
    assert!(error.retryable);

    let retried = controller.retry().await;

    assert_eq!(
        retried,
        Some(Completion::Settled(RequestState::Succeeded(expected_guidance())))
    );
    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].body, calls[1].body);
    assert_eq!(calls[1].body, json!({ "program": "Economics" }));
}

#[tokio::test]
async fn test_clear_error_returns_to_idle() {
    let transport = scripted([ScriptedReply::status(429, "")]);
    let controller = guidance_controller(&transport);

    controller.submit("Economics").await;
    assert!(controller.clear_error());

    assert_eq!(controller.state(), RequestState::Idle);
    assert_eq!(transport.call_count(), 1);
    assert!(controller.retry().await.is_none());
}

#[tokio::test]
async fn test_clear_error_leaves_success_alone() {
    let transport = scripted([ScriptedReply::json(200, guidance_body())]);
    let controller = guidance_controller(&transport);

    controller.submit("Economics").await;

    assert!(!controller.clear_error());
    assert_eq!(controller.state().payload(), Some(&expected_guidance()));
}

#[tokio::test]
async fn test_new_submit_discards_previous_payload() {
    let transport = scripted([
        ScriptedReply::json(200, guidance_body()),
        ScriptedReply::status(404, ""),
    ]);
    let controller = guidance_controller(&transport);

    controller.submit("Economics").await;
    controller.submit("Geology").await;

    let state = controller.state();
    assert!(state.payload().is_none());
    assert_eq!(state.error().map(|e| e.kind), Some(ErrorKind::Server));
}

#[tokio::test]
async fn test_recommendations_flow_uses_its_own_endpoint() {
    let transport = scripted([ScriptedReply::json(
        200,
        json!([{ "title": "Physiotherapist", "skills": ["Anatomy"] }]),
    )]);
    let controller: GuidanceRequestController<CareerRecommendations> =
        GuidanceRequestController::new(transport.clone(), Some(format!("{BASE_URL}/")));

    let completion = controller.submit("Kinesiology").await;

    let Completion::Settled(RequestState::Succeeded(recommendations)) = completion else {
        panic!("expected recommendations");
    };
    assert_eq!(recommendations.0[0].title, "Physiotherapist");
    assert_eq!(transport.calls()[0].url, "http://backend.test/get_recommendations");
}
