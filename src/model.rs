use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::relevance::{ResolutionStats, SelectionContext};

pub const CONFIRMATION_MANIFEST_VERSION: u32 = 1;
pub const RUN_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRecord {
    pub project: String,
    pub tester: String,
    #[serde(default)]
    pub features: BTreeMap<String, bool>,
}

impl From<&SelectionContext> for SelectionRecord {
    fn from(context: &SelectionContext) -> Self {
        Self {
            project: context.project.label().to_string(),
            tester: context.tester.label().to_string(),
            features: context.features().clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub path: String,
    pub sheet: String,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationPoint {
    pub row: usize,
    pub serial: String,
    pub description: String,
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationSection {
    pub heading: String,
    pub points: Vec<ConfirmationPoint>,
}

/// Undecided points awaiting a human answer; edited in place and fed back to `filter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source: SourceRecord,
    pub selection: SelectionRecord,
    pub sections: Vec<ConfirmationSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCounts {
    pub resolution: ResolutionStats,
    pub confirmations_supplied: usize,
    pub confirmations_ignored: usize,
    pub confirmed_points: usize,
    pub applicable_rows: usize,
    pub not_applicable_rows: usize,
    pub confirmed_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub completed_at: String,
    pub command: String,
    pub source: SourceRecord,
    pub selection: SelectionRecord,
    pub confirmations_path: Option<String>,
    pub output_path: String,
    pub relevant_first: bool,
    pub counts: FilterCounts,
    pub warnings: Vec<String>,
}
