//! In-memory transport for tests: replays scripted replies in call order and
//! records every request and every cancelled call.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{HttpResponse, Transport};
use crate::errors::TransportError;

pub struct ScriptedReply {
    delay: Duration,
    result: Result<HttpResponse, TransportError>,
}

impl ScriptedReply {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(HttpResponse::new(status, body)),
        }
    }

    pub fn json(status: u16, body: Value) -> Self {
        Self::status(status, body.to_string())
    }

    pub fn error(error: TransportError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub body: Value,
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ScriptedReply>>,
    calls: Mutex<Vec<RecordedCall>>,
    cancelled: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn cancelled_count(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Counts the call as cancelled if the future is dropped before it finishes.
struct CancelProbe<'a> {
    cancelled: &'a AtomicUsize,
    finished: bool,
}

impl Drop for CancelProbe<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.cancelled.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            body: body.clone(),
        });
        let reply = self.replies.lock().unwrap().pop_front();

        let Some(reply) = reply else {
            return Err(TransportError::Other("no scripted reply".to_string()));
        };

        let mut probe = CancelProbe {
            cancelled: &self.cancelled,
            finished: false,
        };
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        probe.finished = true;
        reply.result
    }
}

/// A complete, valid career-guidance body.
pub fn guidance_body() -> Value {
    json!({
        "keySkills": ["Statistics", "Python"],
        "careerPaths": ["Data Analyst", "Data Scientist"],
        "certifications": ["Google Data Analytics"],
        "industryTrends": ["Growth of applied machine learning"]
    })
}
