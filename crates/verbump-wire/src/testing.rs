//! Scripted in-memory transports for tests
//!
//! Not part of the stable API; exists so downstream crates can exercise the
//! session and pipeline against a deterministic backend. Both fakes expose
//! their traffic through a shared [`TrafficLog`] handle, since the
//! transport itself disappears into the session once boxed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::WireResult;
use crate::transport::Transport;

/// Everything a fake transport saw, in arrival order.
#[derive(Debug, Default)]
pub struct TrafficLog {
    /// Raw events sent by the session.
    pub sent: Vec<Value>,
    /// Inputs of every `response.create`.
    pub requests: Vec<String>,
    /// Instructions of every `session.update`.
    pub configures: Vec<String>,
}

impl TrafficLog {
    /// Number of sent events with the given `type` tag.
    pub fn sent_count(&self, event_type: &str) -> usize {
        self.sent.iter().filter(|e| e["type"] == event_type).count()
    }
}

pub type SharedLog = Arc<Mutex<TrafficLog>>;

fn record(log: &SharedLog, event: &Value) {
    let mut log = log.lock().expect("traffic log poisoned");
    match event["type"].as_str() {
        Some("response.create") => {
            let input = event["input"].as_str().unwrap_or_default().to_string();
            log.requests.push(input);
        }
        Some("session.update") => {
            let instructions = event["session"]["instructions"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            log.configures.push(instructions);
        }
        _ => {}
    }
    log.sent.push(event.clone());
}

/// Replays a fixed queue of incoming events regardless of what is sent.
///
/// Once the queue runs dry the channel reads as closed, which is exactly
/// how a premature remote hangup presents.
pub struct ScriptedTransport {
    incoming: VecDeque<Value>,
    log: SharedLog,
    closed: bool,
}

impl ScriptedTransport {
    pub fn new(incoming: Vec<Value>) -> Self {
        Self {
            incoming: incoming.into(),
            log: SharedLog::default(),
            closed: false,
        }
    }

    /// Handle for inspecting traffic after the transport is boxed away.
    pub fn log(&self) -> SharedLog {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&mut self, event: Value) -> WireResult<()> {
        record(&self.log, &event);
        Ok(())
    }

    async fn recv(&mut self) -> Option<WireResult<Value>> {
        if self.closed {
            return None;
        }
        self.incoming.pop_front().map(Ok)
    }

    async fn close(&mut self) -> WireResult<()> {
        self.closed = true;
        Ok(())
    }
}

/// A request-driven fake backend: acknowledges every session update and
/// answers each analysis request with the next scripted event batch.
pub struct FakeBackend {
    replies: VecDeque<Vec<Value>>,
    outbox: VecDeque<Value>,
    log: SharedLog,
    acks: usize,
    closed: bool,
}

impl FakeBackend {
    /// `replies[i]` is the event batch emitted for the i-th analysis
    /// request. Requests beyond the script leave the channel silent, which
    /// reads as a premature close.
    pub fn new(replies: Vec<Vec<Value>>) -> Self {
        Self {
            replies: replies.into(),
            outbox: VecDeque::new(),
            log: SharedLog::default(),
            acks: 0,
            closed: false,
        }
    }

    /// Handle for inspecting traffic after the transport is boxed away.
    pub fn log(&self) -> SharedLog {
        Arc::clone(&self.log)
    }

    /// Convenience batch: one completed function call carrying `arguments`.
    pub fn function_call(arguments: &str) -> Vec<Value> {
        vec![json!({
            "type": "response.function_call.done",
            "arguments": arguments,
        })]
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&mut self, event: Value) -> WireResult<()> {
        record(&self.log, &event);
        match event["type"].as_str() {
            Some("session.update") => {
                let kind = if self.acks == 0 {
                    "session.created"
                } else {
                    "session.updated"
                };
                self.acks += 1;
                self.outbox
                    .push_back(json!({"type": kind, "session": {"id": "fake-session"}}));
            }
            Some("response.create") => {
                if let Some(batch) = self.replies.pop_front() {
                    self.outbox.extend(batch);
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn recv(&mut self) -> Option<WireResult<Value>> {
        if self.closed {
            return None;
        }
        self.outbox.pop_front().map(Ok)
    }

    async fn close(&mut self) -> WireResult<()> {
        self.closed = true;
        Ok(())
    }
}
