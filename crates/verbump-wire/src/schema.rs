//! Fixed response shapes and their validation
//!
//! The remote declares no shapes of its own: we send it a tool schema
//! (derived from the same structs below) and check every response against
//! the matching [`ResponseSchema`] on receipt. Required fields must be
//! present with the right primitive type; extra fields are tolerated;
//! nothing is coerced or defaulted.

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{WireError, WireResult};
use crate::event::ToolSpec;

/// Per-chunk analysis produced by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChunkSummary {
    /// What changed in this chunk, one or two sentences.
    pub summary: String,
    pub breaking_changes: u64,
    pub fixes: u64,
    pub features: u64,
    pub other_changes: u64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    Patch,
    Minor,
    Major,
    Unknown,
}

impl VersionType {
    pub fn as_str(self) -> &'static str {
        match self {
            VersionType::Patch => "patch",
            VersionType::Minor => "minor",
            VersionType::Major => "major",
            VersionType::Unknown => "unknown",
        }
    }
}

/// The pipeline's sole terminal output.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FinalDecision {
    pub version_type: VersionType,
    pub needs_review: bool,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    String,
    Uint,
    Bool,
    Enum(&'static [&'static str]),
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Uint => value.is_u64(),
            FieldKind::Bool => value.is_boolean(),
            FieldKind::Enum(allowed) => value.as_str().is_some_and(|s| allowed.contains(&s)),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::Uint => "a non-negative integer",
            FieldKind::Bool => "a boolean",
            FieldKind::Enum(_) => "one of the allowed values",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// One of the two fixed shapes a response may take.
#[derive(Debug, Clone, Copy)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

pub const CHUNK_SUMMARY_SCHEMA: ResponseSchema = ResponseSchema {
    name: "chunk_summary",
    fields: &[
        FieldSpec {
            name: "summary",
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "breaking_changes",
            kind: FieldKind::Uint,
        },
        FieldSpec {
            name: "fixes",
            kind: FieldKind::Uint,
        },
        FieldSpec {
            name: "features",
            kind: FieldKind::Uint,
        },
        FieldSpec {
            name: "other_changes",
            kind: FieldKind::Uint,
        },
        FieldSpec {
            name: "reasoning",
            kind: FieldKind::String,
        },
    ],
};

pub const FINAL_DECISION_SCHEMA: ResponseSchema = ResponseSchema {
    name: "final_decision",
    fields: &[
        FieldSpec {
            name: "version_type",
            kind: FieldKind::Enum(&["patch", "minor", "major", "unknown"]),
        },
        FieldSpec {
            name: "needs_review",
            kind: FieldKind::Bool,
        },
        FieldSpec {
            name: "reasoning",
            kind: FieldKind::String,
        },
    ],
};

/// Parse `raw` as JSON and check it against `schema`.
///
/// Parse failures report the JSON error; shape failures list every missing
/// or mistyped required field at once.
pub fn validate(raw: &str, schema: &ResponseSchema) -> WireResult<Value> {
    let value: Value = serde_json::from_str(raw).map_err(WireError::MalformedJson)?;

    let Some(object) = value.as_object() else {
        return Err(WireError::SchemaViolation {
            schema: schema.name,
            problems: "response is not a JSON object".into(),
        });
    };

    let mut problems = Vec::new();
    for field in schema.fields {
        match object.get(field.name) {
            None => problems.push(format!("missing `{}`", field.name)),
            Some(v) if !field.kind.matches(v) => problems.push(format!(
                "`{}` is not {}",
                field.name,
                field.kind.describe()
            )),
            Some(_) => {}
        }
    }

    if problems.is_empty() {
        Ok(value)
    } else {
        Err(WireError::SchemaViolation {
            schema: schema.name,
            problems: problems.join(", "),
        })
    }
}

/// Tool declaration for the per-chunk summarize phase.
pub fn chunk_summary_tool() -> ToolSpec {
    ToolSpec {
        name: "report_chunk_summary".into(),
        description: "Record categorized change counts for one piece of the diff".into(),
        parameters: schema_for!(ChunkSummary).to_value(),
    }
}

/// Tool declaration for the final decide phase.
pub fn final_decision_tool() -> ToolSpec {
    ToolSpec {
        name: "report_version_decision".into(),
        description: "Record the semantic version bump decision for the whole change set".into(),
        parameters: schema_for!(FinalDecision).to_value(),
    }
}
