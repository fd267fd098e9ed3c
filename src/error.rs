use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChecklistError {
    #[error("sheet '{sheet}' is missing required column(s): {}", .missing.join(", "))]
    MissingColumns { sheet: String, missing: Vec<String> },

    #[error("unknown {kind} '{value}'; expected one of: {}", .allowed.join(", "))]
    UnknownSelection {
        kind: &'static str,
        value: String,
        allowed: Vec<String>,
    },

    #[error("invalid feature flag '{0}'; expected NAME=true or NAME=false")]
    InvalidFeatureFlag(String),

    #[error(
        "confirmation manifest was produced for a different checklist (expected sha256 {expected}, found {found})"
    )]
    SourceMismatch { expected: String, found: String },
}
