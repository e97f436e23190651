//! Duplex channel seam and its stdio implementation

use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::error::{WireError, WireResult};

/// Environment variable holding the backend credential. Read by the CLI at
/// startup and injected into the spawned backend's environment.
pub const TOKEN_ENV: &str = "VERBUMP_TOKEN";

/// A duplex channel carrying one JSON event per message.
///
/// The backend that performs inference is consumed purely through this
/// trait; tests substitute scripted in-memory implementations.
#[async_trait]
pub trait Transport: Send {
    /// Send one encoded event to the remote.
    async fn send(&mut self, event: Value) -> WireResult<()>;

    /// Receive the next event. `None` means the channel has closed.
    async fn recv(&mut self) -> Option<WireResult<Value>>;

    /// Terminate the channel. Idempotent.
    async fn close(&mut self) -> WireResult<()>;
}

/// Newline-delimited JSON over the stdio of a spawned backend command.
pub struct StdioTransport {
    child: Child,
    stdin: Option<ChildStdin>,
    lines: LinesStream<BufReader<ChildStdout>>,
}

impl StdioTransport {
    /// Spawn `command` with the credential in its environment and wire up
    /// line-framed JSON over its stdin/stdout.
    pub async fn spawn(command: &str, token: &str) -> WireResult<Self> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| WireError::Connection("backend command is empty".into()))?;

        let mut child = Command::new(program)
            .args(parts)
            .env(TOKEN_ENV, token)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| WireError::Connection(format!("failed to spawn `{program}`: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| WireError::Connection("backend stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| WireError::Connection("backend stdout unavailable".into()))?;

        debug!(program, "backend spawned");
        Ok(Self {
            child,
            stdin: Some(stdin),
            lines: LinesStream::new(BufReader::new(stdout).lines()),
        })
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn send(&mut self, event: Value) -> WireResult<()> {
        let stdin = self.stdin.as_mut().ok_or(WireError::PrematureClose)?;
        let mut line = serde_json::to_string(&event).map_err(WireError::Encode)?;
        line.push('\n');
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<WireResult<Value>> {
        match self.lines.next().await? {
            Ok(line) => Some(serde_json::from_str(&line).map_err(WireError::MalformedJson)),
            Err(e) => Some(Err(WireError::Io(e))),
        }
    }

    async fn close(&mut self) -> WireResult<()> {
        // Dropping stdin signals EOF; well-behaved backends exit on it.
        self.stdin.take();
        let _ = self.child.start_kill();
        Ok(())
    }
}
