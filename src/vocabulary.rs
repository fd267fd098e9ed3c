use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::util::read_json;

pub const DEFAULT_PROJECTS: &[&str] = &[
    "Intel",
    "Xilinx",
    "AMD",
    "Nvidia",
    "Hi-Silicon",
    "Advantest",
    "Mellanox",
];
pub const DEFAULT_TESTERS: &[&str] = &["93K", "T2K", "Ultraflex"];
pub const DEFAULT_SUPPRESSION_PHRASES: &[&str] =
    &["for reference", "for e.g.", "for example", "qa only"];
pub const DEFAULT_RESTRICTED_PHRASES: &[&str] = &["qa only"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureGate {
    pub feature: String,
    pub keywords: Vec<String>,
}

/// Term lists driving tag extraction and feature gating.
///
/// Every field is optional in the JSON file; absent fields keep the built-in
/// defaults so a file only has to list what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub projects: Vec<String>,
    pub testers: Vec<String>,
    pub suppression_phrases: Vec<String>,
    pub restricted_phrases: Vec<String>,
    pub feature_gates: Vec<FeatureGate>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            projects: to_owned_list(DEFAULT_PROJECTS),
            testers: to_owned_list(DEFAULT_TESTERS),
            suppression_phrases: to_owned_list(DEFAULT_SUPPRESSION_PHRASES),
            restricted_phrases: to_owned_list(DEFAULT_RESTRICTED_PHRASES),
            feature_gates: vec![FeatureGate {
                feature: "relays".to_string(),
                keywords: vec!["relay".to_string(), "relays".to_string()],
            }],
        }
    }
}

pub fn load_vocabulary(path: Option<&Path>) -> Result<Vocabulary> {
    let Some(path) = path else {
        return Ok(Vocabulary::default());
    };

    read_json(path)
}

fn to_owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
