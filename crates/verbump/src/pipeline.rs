//! The analysis pipeline: filter -> chunk -> summarize -> decide
//!
//! One pipeline run owns one session over one connection. Chunks are
//! summarized strictly in order (the remote's session phase is shared
//! mutable state, so interleaving requests would corrupt it) and the
//! accumulated summaries feed a single final decision exchange. Nothing is
//! recovered past the per-exchange retry layer: once retries are
//! exhausted, the whole run fails rather than substituting a default
//! decision.

use std::future::Future;

use thiserror::Error;
use tracing::{debug, info, warn};

use verbump_diff::{filter_diff, split_into_chunks, ChunkOptions, IgnoreRules, PatternError};
use verbump_wire::{
    chunk_summary_tool, exchange_with_retry, final_decision_tool, ChunkSummary, FinalDecision,
    Session, SessionPhase, Transport, VersionType, WireError, CHUNK_SUMMARY_SCHEMA,
    FINAL_DECISION_SCHEMA,
};

use crate::config::AnalyzerConfig;
use crate::prompts;

/// Pipeline failures, labelled with the phase that raised them.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid ignore pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("Failed to open the analysis session: {0}")]
    Open(#[source] WireError),

    #[error("Failed to configure the session for {phase}: {source}")]
    Configure {
        phase: &'static str,
        #[source]
        source: WireError,
    },

    #[error("Failed while summarizing chunk {index} of {total}: {source}")]
    Summarize {
        index: usize,
        total: usize,
        #[source]
        source: WireError,
    },

    #[error("Failed while deciding the version bump: {source}")]
    Decide {
        #[source]
        source: WireError,
    },
}

fn short_circuit(reasoning: &str) -> FinalDecision {
    FinalDecision {
        version_type: VersionType::Unknown,
        needs_review: true,
        reasoning: reasoning.into(),
    }
}

/// Run the full analysis over `diff`, connecting lazily via `connect`.
///
/// Absent or tiny diffs (and diffs whose every file is ignored) resolve to
/// `unknown` with `needs_review` set, without any network activity.
pub async fn analyze<F, Fut>(
    config: &AnalyzerConfig,
    diff: &str,
    connect: F,
) -> Result<FinalDecision, PipelineError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Box<dyn Transport>, WireError>>,
{
    if diff.trim().len() < config.min_diff_len {
        info!(len = diff.trim().len(), "diff absent or too small, skipping analysis");
        return Ok(short_circuit("Diff is absent or too small to analyze"));
    }

    let rules = IgnoreRules::with_extra(&config.extra_ignore)?;
    let filtered = filter_diff(diff, &rules);
    let chunks = split_into_chunks(
        &filtered,
        &ChunkOptions {
            chunk_size: config.chunk_size,
            max_chunks: config.max_chunks,
        },
    );
    if chunks.is_empty() {
        info!("every changed file matched an ignore pattern, skipping analysis");
        return Ok(short_circuit("All changes matched ignored paths"));
    }
    info!(
        chunks = chunks.len(),
        filtered_len = filtered.len(),
        "analyzing diff"
    );

    let transport = connect().await.map_err(PipelineError::Open)?;
    let mut session = Session::new(transport);

    session
        .configure(
            prompts::SUMMARIZE_INSTRUCTIONS,
            chunk_summary_tool(),
            SessionPhase::Summarizing,
        )
        .await
        .map_err(|source| PipelineError::Configure {
            phase: "summarizing",
            source,
        })?;

    let total = chunks.len();
    let mut summaries: Vec<ChunkSummary> = Vec::with_capacity(total);
    for chunk in &chunks {
        let index = chunk.index + 1;
        debug!(chunk = index, total, "summarizing chunk");
        let prompt = prompts::chunk_prompt(chunk, total);
        let value = exchange_with_retry(
            &mut session,
            &prompt,
            &CHUNK_SUMMARY_SCHEMA,
            config.max_attempts,
        )
        .await
        .map_err(|source| PipelineError::Summarize {
            index,
            total,
            source,
        })?;
        let summary = serde_json::from_value(value).map_err(|e| PipelineError::Summarize {
            index,
            total,
            source: WireError::MalformedJson(e),
        })?;
        summaries.push(summary);
    }

    session
        .configure(
            prompts::DECIDE_INSTRUCTIONS,
            final_decision_tool(),
            SessionPhase::Deciding,
        )
        .await
        .map_err(|source| PipelineError::Configure {
            phase: "deciding",
            source,
        })?;

    let prompt = prompts::decision_prompt(&summaries).map_err(|e| PipelineError::Decide {
        source: WireError::Encode(e),
    })?;
    let value = exchange_with_retry(
        &mut session,
        &prompt,
        &FINAL_DECISION_SCHEMA,
        config.max_attempts,
    )
    .await
    .map_err(|source| PipelineError::Decide { source })?;
    let decision: FinalDecision =
        serde_json::from_value(value).map_err(|e| PipelineError::Decide {
            source: WireError::MalformedJson(e),
        })?;

    if let Err(e) = session.close().await {
        warn!(error = %e, "failed to close the session cleanly");
    }
    info!(
        version_type = decision.version_type.as_str(),
        needs_review = decision.needs_review,
        "analysis complete"
    );
    Ok(decision)
}
