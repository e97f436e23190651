//! Instructions and prompt construction for both analysis phases

use verbump_diff::Chunk;
use verbump_wire::ChunkSummary;

/// Session instructions for the per-chunk summarize phase.
pub const SUMMARIZE_INSTRUCTIONS: &str = "\
You are a release engineer reviewing one piece of a larger change set. \
Classify every change you see: count breaking changes to public behavior \
or interfaces, bug fixes, new backwards-compatible features, and other \
changes (refactors, chores, internal cleanups). Report the counts and a \
short summary through the declared tool. Judge only what is visible in \
the diff text; do not guess about code you cannot see.";

/// Session instructions for the final decide phase.
pub const DECIDE_INSTRUCTIONS: &str = "\
You are a release engineer deciding a semantic version bump. You will \
receive per-piece summaries of an already-reviewed change set. Any \
breaking change means major; otherwise any feature means minor; otherwise \
any fix means patch. If the summaries are contradictory or too vague to \
support a confident decision, answer unknown and request review. Report \
the decision through the declared tool.";

/// Prompt for one chunk of the filtered diff.
pub fn chunk_prompt(chunk: &Chunk, total: usize) -> String {
    format!(
        "Analyze part {} of {} of the change set and report the \
         categorized change counts.\n\n{}",
        chunk.index + 1,
        total,
        chunk.text
    )
}

/// Prompt embedding every accumulated chunk summary, in original order.
pub fn decision_prompt(summaries: &[ChunkSummary]) -> Result<String, serde_json::Error> {
    let serialized = serde_json::to_string_pretty(summaries)?;
    Ok(format!(
        "Decide the semantic version bump for a change set reviewed in \
         {} part(s). The per-part summaries follow.\n\n{}",
        summaries.len(),
        serialized
    ))
}
