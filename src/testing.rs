//! Test doubles shared across module tests.

use crate::platform::{RawResponse, Request, Transport, TransportError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Clone)]
pub enum Reply {
    Respond(u16, String),
    Fail(TransportError),
    Delay(Duration, u16, String),
    Panic,
}

/// Transport that answers by URL substring and records what it saw.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<(String, Reply)>>,
    seen: Mutex<Vec<Request>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or replaces) the reply for URLs containing `fragment`.
    pub fn route(&self, fragment: &str, reply: Reply) {
        let mut routes = self.routes.lock().unwrap();
        routes.retain(|(existing, _)| existing != fragment);
        routes.push((fragment.to_string(), reply));
    }

    pub fn ok(&self, fragment: &str, body: serde_json::Value) {
        self.route(fragment, Reply::Respond(200, body.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.seen.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &Request) -> Result<RawResponse, TransportError> {
        self.seen.lock().unwrap().push(request.clone());
        let reply = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _)| request.url.contains(fragment.as_str()))
            .map(|(_, reply)| reply.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let result = match reply {
            Some(Reply::Respond(status, body)) => Ok(RawResponse { status, body }),
            Some(Reply::Fail(err)) => Err(err),
            Some(Reply::Delay(wait, status, body)) => {
                std::thread::sleep(wait);
                Ok(RawResponse { status, body })
            }
            Some(Reply::Panic) => {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                panic!("mock transport asked to panic for {}", request.url);
            }
            None => Err(TransportError::Connect(format!("no mock route for {}", request.url))),
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
