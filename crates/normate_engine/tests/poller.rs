mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{completed_result, processing, RecordingSink, ScriptedClient};
use normate_core::{ErrorKind, PollPhase, PollPolicy, StatusReport, DEFAULT_MAX_ATTEMPTS};
use normate_engine::{ApiError, ApiFailureKind, PollEvent, ResultPoller};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

fn fast_policy() -> PollPolicy {
    PollPolicy {
        max_attempts: DEFAULT_MAX_ATTEMPTS,
        interval: Duration::from_millis(1),
    }
}

fn poller(client: &Arc<ScriptedClient>) -> ResultPoller {
    common::init_logging();
    ResultPoller::new(client.clone(), fast_policy())
}

#[tokio::test]
async fn processing_twice_then_completed_yields_result() {
    let client = Arc::new(ScriptedClient::with_statuses(vec![
        processing(),
        processing(),
        Ok(StatusReport::Completed(Box::new(completed_result("job1")))),
    ]));
    let sink = RecordingSink::default();

    let state = poller(&client)
        .run("job1", &CancellationToken::new(), &sink)
        .await
        .expect("not cancelled");

    assert_eq!(state.phase, PollPhase::Ready);
    assert_eq!(state.attempt, 3);
    assert_eq!(client.status_calls(), 3);

    let events = sink.take();
    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], PollEvent::Progress(s) if s.attempt == 1));
    assert!(matches!(&events[1], PollEvent::Progress(s) if s.attempt == 2));
    match &events[2] {
        PollEvent::Finished(Ok(result)) => assert_eq!(result.job_id, "job1"),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn failed_on_first_poll_stops_immediately() {
    let client = Arc::new(ScriptedClient::with_statuses(vec![Ok(StatusReport::Failed {
        reason: "bad input".to_string(),
    })]));
    let sink = RecordingSink::default();

    let state = poller(&client)
        .run("job1", &CancellationToken::new(), &sink)
        .await
        .unwrap();

    assert_eq!(state.phase, PollPhase::Error);
    assert_eq!(client.status_calls(), 1);
    assert_eq!(
        sink.take(),
        vec![PollEvent::Finished(Err(ErrorKind::AnalysisFailed {
            reason: "bad input".to_string()
        }))]
    );
}

#[tokio::test]
async fn never_fetches_more_than_the_attempt_budget() {
    let client = Arc::new(ScriptedClient::default());
    let sink = RecordingSink::default();

    let state = poller(&client)
        .run("job1", &CancellationToken::new(), &sink)
        .await
        .unwrap();

    assert_eq!(client.status_calls(), 60);
    assert_eq!(state.attempt, 60);
    assert_eq!(
        state.last_error,
        Some(ErrorKind::Timeout { attempts: 60 })
    );
    let events = sink.take();
    assert_eq!(events.len(), 60);
    assert_eq!(
        events.last(),
        Some(&PollEvent::Finished(Err(ErrorKind::Timeout { attempts: 60 })))
    );
}

#[tokio::test]
async fn accepted_transport_response_keeps_waiting() {
    let client = Arc::new(ScriptedClient::with_statuses(vec![
        Err(ApiError::new(ApiFailureKind::NotReady, "accepted")),
        Ok(StatusReport::Completed(Box::new(completed_result("job1")))),
    ]));
    let sink = RecordingSink::default();

    let state = poller(&client)
        .run("job1", &CancellationToken::new(), &sink)
        .await
        .unwrap();

    assert_eq!(state.phase, PollPhase::Ready);
    assert_eq!(client.status_calls(), 2);
}

#[tokio::test]
async fn other_transport_errors_abort_polling() {
    let client = Arc::new(ScriptedClient::with_statuses(vec![
        processing(),
        Err(ApiError::new(ApiFailureKind::NotFound, "Job not found.")),
    ]));
    let sink = RecordingSink::default();

    let state = poller(&client)
        .run("job1", &CancellationToken::new(), &sink)
        .await
        .unwrap();

    assert_eq!(state.phase, PollPhase::Error);
    assert_eq!(client.status_calls(), 2);
    assert!(matches!(
        state.last_error,
        Some(ErrorKind::StatusUnavailable { .. })
    ));
}

#[tokio::test]
async fn cancelled_before_start_fetches_nothing() {
    let client = Arc::new(ScriptedClient::default());
    let sink = RecordingSink::default();
    let token = CancellationToken::new();
    token.cancel();

    let state = poller(&client).run("job1", &token, &sink).await;

    assert_eq!(state, None);
    assert_eq!(client.status_calls(), 0);
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn cancelling_a_spawned_poll_stops_fetching_and_publishing() {
    common::init_logging();
    let client = Arc::new(ScriptedClient::default());
    let poller = Arc::new(ResultPoller::new(
        client.clone(),
        PollPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: Duration::from_millis(20),
        },
    ));

    let mut handle = poller.spawn("job1");
    let first = handle.next().await;
    assert!(matches!(first, Some(PollEvent::Progress(_))));

    handle.cancel();
    let calls_at_cancel = client.status_calls();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(client.status_calls(), calls_at_cancel);
    assert!(handle.next().await.is_none());
    assert_eq!(handle.join().await, None);
}

#[tokio::test]
async fn answer_for_a_fetch_in_flight_at_cancel_is_discarded() {
    common::init_logging();
    let gate = Arc::new(tokio::sync::Notify::new());
    let client = Arc::new(ScriptedClient::gated(
        vec![Ok(StatusReport::Completed(Box::new(completed_result("job1"))))],
        gate.clone(),
    ));
    let poller = Arc::new(ResultPoller::new(client.clone(), fast_policy()));

    let mut handle = poller.spawn("job1");
    client.fetch_started.notified().await;

    handle.cancel();
    gate.notify_one();

    assert!(handle.next().await.is_none());
    assert_eq!(handle.join().await, None);
    assert_eq!(client.status_calls(), 1);
}

#[tokio::test]
async fn cancel_during_fetch_publishes_nothing_to_the_sink() {
    common::init_logging();
    let gate = Arc::new(tokio::sync::Notify::new());
    let client = Arc::new(ScriptedClient::gated(
        vec![Ok(StatusReport::Completed(Box::new(completed_result("job1"))))],
        gate.clone(),
    ));
    let poller = Arc::new(ResultPoller::new(client.clone(), fast_policy()));
    let sink = Arc::new(RecordingSink::default());
    let token = CancellationToken::new();

    let task = {
        let (poller, sink, token) = (poller.clone(), sink.clone(), token.clone());
        tokio::spawn(async move { poller.run("job1", &token, sink.as_ref()).await })
    };
    client.fetch_started.notified().await;

    token.cancel();
    gate.notify_one();

    assert_eq!(task.await.unwrap(), None);
    assert!(sink.take().is_empty());
}
