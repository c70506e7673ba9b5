use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chat_engine::{
    ChatTransport, EngineEvent, EngineHandle, FailureKind, FetchReply, PaginationHeaders,
    TransportError,
};

#[derive(Default)]
struct RecordingTransport {
    queries: Mutex<Vec<String>>,
    posts: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl ChatTransport for RecordingTransport {
    async fn fetch(&self, query: &str) -> Result<FetchReply, TransportError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(FetchReply::Content {
            html: format!("<p>{query}</p>"),
            markers: PaginationHeaders::default(),
            encoding_label: "UTF-8".to_string(),
        })
    }

    async fn post(&self, body: &str) -> Result<(), TransportError> {
        self.posts.lock().unwrap().push(body.to_string());
        if body == "reject" {
            return Err(TransportError::new(FailureKind::HttpStatus(403), "Forbidden"));
        }
        Ok(())
    }
}

fn wait_for(
    engine: &EngineHandle,
    mut predicate: impl FnMut(&EngineEvent) -> bool,
) -> Option<EngineEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(event) = engine.recv_timeout(Duration::from_millis(50)) {
            if predicate(&event) {
                return Some(event);
            }
        }
    }
    None
}

#[test]
fn fetch_completion_carries_ticket_and_query() {
    chat_logging::initialize_for_tests();
    let transport = Arc::new(RecordingTransport::default());
    let engine = EngineHandle::with_transport(transport.clone()).expect("engine");

    engine.fetch(7, "upper_bound=12");
    let event = wait_for(&engine, |event| {
        matches!(event, EngineEvent::FetchCompleted { .. })
    })
    .expect("fetch event");

    match event {
        EngineEvent::FetchCompleted {
            ticket,
            query,
            result,
        } => {
            assert_eq!(ticket, 7);
            assert_eq!(query, "upper_bound=12");
            assert!(matches!(result, Ok(FetchReply::Content { .. })));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(*transport.queries.lock().unwrap(), vec!["upper_bound=12"]);
}

#[test]
fn post_results_are_reported() {
    chat_logging::initialize_for_tests();
    let transport = Arc::new(RecordingTransport::default());
    let engine = EngineHandle::with_transport(transport.clone()).expect("engine");

    engine.post("hello");
    let ok = wait_for(&engine, |event| {
        matches!(event, EngineEvent::PostCompleted { .. })
    });
    assert_eq!(ok, Some(EngineEvent::PostCompleted { result: Ok(()) }));

    engine.post("reject");
    let failed = wait_for(&engine, |event| {
        matches!(event, EngineEvent::PostCompleted { .. })
    });
    assert!(matches!(
        failed,
        Some(EngineEvent::PostCompleted { result: Err(_) })
    ));
    assert_eq!(*transport.posts.lock().unwrap(), vec!["hello", "reject"]);
}

#[test]
fn poll_timer_ticks_until_stopped() {
    chat_logging::initialize_for_tests();
    let engine =
        EngineHandle::with_transport(Arc::new(RecordingTransport::default())).expect("engine");

    engine.start_polling(Duration::from_millis(20));
    assert!(wait_for(&engine, |event| *event == EngineEvent::PollTick).is_some());
    assert!(wait_for(&engine, |event| *event == EngineEvent::PollTick).is_some());

    engine.stop_polling();
    // Drain ticks that raced the stop command.
    while engine.recv_timeout(Duration::from_millis(100)).is_some() {}
    assert_eq!(engine.recv_timeout(Duration::from_millis(150)), None);
}
