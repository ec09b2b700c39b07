//! Shared helpers for unit tests

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;

use crate::{
    handler::Handler,
    reporter::{InjectorState, Reporter},
};

/// Status written by the terminal handler. Not 200, so a default response
/// can never be mistaken for it.
pub const TEST_HANDLER_CODE: StatusCode = StatusCode::ACCEPTED;
pub const TEST_HANDLER_BODY: &str = "Accepted";
pub const TEST_HEADER_KEY: &str = "x-testing-key";
pub const TEST_HEADER_VAL: &str = "testing header val";

pub fn test_request(path: &str) -> Request {
    Request::builder()
        .uri(path)
        .header(TEST_HEADER_KEY, TEST_HEADER_VAL)
        .body(Body::empty())
        .unwrap()
}

pub fn terminal() -> Handler {
    Handler::new(|_req| async { Ok((TEST_HANDLER_CODE, TEST_HANDLER_BODY).into_response()) })
}

pub fn counting_terminal(calls: Arc<AtomicUsize>) -> Handler {
    Handler::new(move |_req| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok((TEST_HANDLER_CODE, TEST_HANDLER_BODY).into_response()) }
    })
}

pub async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<(String, InjectorState)>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<(String, InjectorState)> {
        self.events.lock().clone()
    }

    /// Wait until `count` events arrived, then return them sorted
    pub async fn wait_for(&self, count: usize) -> Vec<(String, InjectorState)> {
        for _ in 0..1_000 {
            if self.events.lock().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let mut events = self.events();
        events.sort();
        events
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, name: &str, state: InjectorState) {
        self.events.lock().push((name.to_owned(), state));
    }
}

#[derive(Debug)]
pub struct PanickingReporter;

impl Reporter for PanickingReporter {
    fn report(&self, _name: &str, _state: InjectorState) {
        panic!("reporter failure");
    }
}

#[derive(Debug)]
pub struct SleepingReporter(pub Duration);

impl Reporter for SleepingReporter {
    fn report(&self, _name: &str, _state: InjectorState) {
        thread::sleep(self.0);
    }
}
