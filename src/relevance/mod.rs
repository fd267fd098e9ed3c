//! Row-relevance classification for sectioned checklists.
//!
//! Rows flow through three stages: annotation (tags, base serial, section),
//! resolution (one verdict per `(section, base serial)` key) and the merge of
//! manual confirmations into the final relevance column.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ChecklistError;
use crate::vocabulary::Vocabulary;

mod merge;
mod resolver;
mod rules;
mod sections;
mod selection;
mod serial;
mod tags;

pub use merge::{ConfirmationMap, PendingSection, RowRef, merge, pending_sections};
pub use resolver::{ExcludedBy, RelevantBy, Resolution, ResolutionStats, ResolvedRow, Verdict, resolve};
pub use rules::{RuleSet, SelectionOptions};
pub use sections::assign_sections;
pub use selection::{Selection, SelectionContext, WILDCARD};
pub use serial::{base_of, is_main_point, normalize_serial};
pub use tags::TagExtractor;

/// Final state of a row's relevance column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relevance {
    Applicable,
    NotApplicable,
    Confirmed,
}

impl Relevance {
    pub fn marker(self) -> &'static str {
        match self {
            Self::Applicable => "",
            Self::NotApplicable => "NA",
            Self::Confirmed => "Checked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistRow {
    /// Zero-based index of the data row in its sheet.
    pub position: usize,
    pub serial: Option<String>,
    pub description: String,
}

impl ChecklistRow {
    pub fn new(position: usize, serial: Option<&str>, description: &str) -> Self {
        Self {
            position,
            serial: normalize_serial(serial),
            description: description.trim().to_string(),
        }
    }

    pub fn is_heading(&self) -> bool {
        self.serial.is_none()
    }
}

/// Grouping key shared by a main point and its sub-points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PointKey {
    pub section: String,
    pub base_serial: String,
}

/// A row plus the metadata derived for one classification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedRow {
    pub row: ChecklistRow,
    pub section: String,
    pub base_serial: Option<String>,
    pub is_main_point: bool,
    pub project_tags: BTreeSet<String>,
    pub tester_tags: BTreeSet<String>,
}

impl AnnotatedRow {
    pub fn key(&self) -> Option<PointKey> {
        self.base_serial.as_ref().map(|base_serial| PointKey {
            section: self.section.clone(),
            base_serial: base_serial.clone(),
        })
    }

    pub fn is_heading(&self) -> bool {
        self.row.is_heading()
    }

    pub fn is_generic(&self) -> bool {
        self.project_tags.is_empty() && self.tester_tags.is_empty()
    }
}
