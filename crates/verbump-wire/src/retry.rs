//! Bounded retry around a single logical exchange

use serde_json::Value;
use tracing::warn;

use crate::error::{WireError, WireResult};
use crate::schema::{validate, ResponseSchema};
use crate::session::Session;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Run one logical request until a validated response or attempts run out.
///
/// An empty or whitespace-only response counts as a failed attempt, as do
/// transport errors, parse errors, and schema violations. Attempts run
/// back to back with no backoff; after `max_attempts` consecutive
/// failures the last underlying error is returned wrapped in
/// [`WireError::ExhaustedRetries`], which is fatal for the pipeline.
pub async fn exchange_with_retry(
    session: &mut Session,
    prompt: &str,
    schema: &ResponseSchema,
    max_attempts: u32,
) -> WireResult<Value> {
    let mut last = WireError::EmptyResponse;

    for attempt in 1..=max_attempts {
        let failure = match session.exchange(prompt).await {
            Ok(raw) if raw.trim().is_empty() => WireError::EmptyResponse,
            Ok(raw) => match validate(&raw, schema) {
                Ok(value) => return Ok(value),
                Err(e) => e,
            },
            Err(e) => e,
        };
        warn!(
            attempt,
            max_attempts,
            schema = schema.name,
            error = %failure,
            "exchange attempt failed"
        );
        last = failure;
    }

    Err(WireError::ExhaustedRetries {
        attempts: max_attempts,
        last: Box::new(last),
    })
}
