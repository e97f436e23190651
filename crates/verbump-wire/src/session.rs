//! Session state machine over the duplex channel
//!
//! Turns the asynchronous event stream back into blocking call/return
//! exchanges. Each [`Session::exchange`] settles exactly once: with the
//! structured arguments when the remote streams a function call, with the
//! accumulated free text otherwise, or with an error. The remote's session
//! phase is global mutable state, so exchanges take `&mut self` and a
//! second in-flight request is unrepresentable.

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::{WireError, WireResult};
use crate::event::{ClientEvent, ServerEvent, SessionConfig, ToolSpec};
use crate::transport::Transport;

/// Where the session is in its lifecycle. The analysis phase mirrors the
/// remote's own state: reconfiguring for the decide step invalidates the
/// summarize-step tool, which is why exchanges are strictly sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Summarizing,
    Deciding,
    Closed,
}

impl SessionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Uninitialized => "uninitialized",
            SessionPhase::Summarizing => "summarizing",
            SessionPhase::Deciding => "deciding",
            SessionPhase::Closed => "closed",
        }
    }
}

/// One stateful exchange context with the remote analysis service,
/// reused for every chunk exchange and the final decision.
pub struct Session {
    transport: Box<dyn Transport>,
    id: Option<String>,
    phase: SessionPhase,
}

impl Session {
    /// Wrap an established channel. The channel is assumed usable; opening
    /// it (and failing fast when it is not) is the transport's job.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            id: None,
            phase: SessionPhase::Uninitialized,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Overwrite the remote session's instructions and declared tool,
    /// entering `phase`. Completes when the matching acknowledgement event
    /// arrives with a session id. Callable more than once per session; the
    /// connection and the session id stream are kept.
    pub async fn configure(
        &mut self,
        instructions: &str,
        tool: ToolSpec,
        phase: SessionPhase,
    ) -> WireResult<()> {
        if self.phase == SessionPhase::Closed {
            return Err(WireError::BadState {
                op: "configure",
                state: self.phase.as_str(),
            });
        }

        self.send(ClientEvent::SessionUpdate {
            session: SessionConfig {
                instructions: instructions.to_string(),
                tool,
            },
        })
        .await?;

        loop {
            match self.next_event().await? {
                ServerEvent::SessionCreated { session }
                | ServerEvent::SessionUpdated { session } => {
                    if let Some(existing) = &self.id {
                        if existing != &session.id {
                            warn!(old = %existing, new = %session.id, "session id changed");
                        }
                    }
                    debug!(id = %session.id, phase = phase.as_str(), "session configured");
                    self.id = Some(session.id);
                    self.phase = phase;
                    return Ok(());
                }
                ServerEvent::Error { error } => return Err(WireError::Remote(error.message)),
                other => trace!(?other, "ignoring event while awaiting session ack"),
            }
        }
    }

    /// Send one analysis request and block until its terminal event.
    ///
    /// Function-call fragments accumulate until the done event, which
    /// resolves immediately with the full arguments string. Text output is
    /// the fallback path: partial and final text accumulate, and a plain
    /// `Done` resolves with whatever text arrived, possibly an empty
    /// string, which the retry layer treats as a failed attempt.
    pub async fn exchange(&mut self, prompt: &str) -> WireResult<String> {
        match self.phase {
            SessionPhase::Summarizing | SessionPhase::Deciding => {}
            other => {
                return Err(WireError::BadState {
                    op: "exchange",
                    state: other.as_str(),
                })
            }
        }

        self.send(ClientEvent::ResponseCreate {
            input: prompt.to_string(),
        })
        .await?;

        let mut call_arguments = String::new();
        let mut text = String::new();

        loop {
            match self.next_event().await? {
                ServerEvent::FunctionCallDelta { delta } => call_arguments.push_str(&delta),
                ServerEvent::FunctionCallDone { arguments } => {
                    return Ok(if arguments.is_empty() {
                        call_arguments
                    } else {
                        arguments
                    });
                }
                ServerEvent::TextDelta { delta } => text.push_str(&delta),
                ServerEvent::TextDone { text: full } => text.push_str(&full),
                ServerEvent::Done => return Ok(text),
                ServerEvent::Error { error } => return Err(WireError::Remote(error.message)),
                ServerEvent::SessionCreated { session }
                | ServerEvent::SessionUpdated { session } => {
                    trace!(id = %session.id, "session event during exchange");
                }
                ServerEvent::Unknown => trace!("ignoring unrecognized event"),
            }
        }
    }

    /// Terminate the channel. Idempotent; an in-flight exchange on a
    /// channel closed by the remote settles with `PrematureClose` rather
    /// than hanging.
    pub async fn close(&mut self) -> WireResult<()> {
        if self.phase == SessionPhase::Closed {
            return Ok(());
        }
        debug!(id = ?self.id, "closing session");
        self.phase = SessionPhase::Closed;
        self.transport.close().await
    }

    async fn send(&mut self, event: ClientEvent) -> WireResult<()> {
        let value = serde_json::to_value(&event).map_err(WireError::Encode)?;
        self.transport.send(value).await
    }

    async fn next_event(&mut self) -> WireResult<ServerEvent> {
        match self.transport.recv().await {
            Some(Ok(value)) => serde_json::from_value(value).map_err(WireError::MalformedJson),
            Some(Err(e)) => Err(e),
            None => Err(WireError::PrematureClose),
        }
    }
}
