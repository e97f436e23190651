//! Session-oriented request/response protocol for structured inference
//!
//! The remote analysis service is consumed as a duplex channel carrying one
//! JSON event per message. This crate owns everything between that channel
//! and the pipeline: the typed event unions, the [`Transport`] seam with its
//! stdio implementation, the [`Session`] state machine that turns the event
//! stream back into call/return exchanges, fixed-shape response validation,
//! and the bounded retry wrapper.
//!
//! The protocol is strictly turn-based: one request is in flight at a time,
//! and a new exchange must not start until the previous one has settled.
//! `Session` enforces this with `&mut self` receivers rather than runtime
//! ordering discipline.

mod error;
mod event;
mod retry;
mod schema;
mod session;
pub mod testing;
mod transport;

pub use error::{WireError, WireResult};
pub use event::{ClientEvent, ErrorInfo, ServerEvent, SessionConfig, SessionInfo, ToolSpec};
pub use retry::{exchange_with_retry, DEFAULT_MAX_ATTEMPTS};
pub use schema::{
    chunk_summary_tool, final_decision_tool, validate, ChunkSummary, FieldKind, FieldSpec,
    FinalDecision, ResponseSchema, VersionType, CHUNK_SUMMARY_SCHEMA, FINAL_DECISION_SCHEMA,
};
pub use session::{Session, SessionPhase};
pub use transport::{StdioTransport, Transport, TOKEN_ENV};
