use super::*;

pub const WILDCARD: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection {
    All,
    Only(String),
}

impl Selection {
    /// The wildcard matches every tag set, including the empty one.
    pub fn matches(&self, tags: &BTreeSet<String>) -> bool {
        match self {
            Self::All => true,
            Self::Only(value) => tags.contains(value),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => WILDCARD,
            Self::Only(value) => value,
        }
    }
}

/// Project, tester and feature flags chosen for one classification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionContext {
    pub project: Selection,
    pub tester: Selection,
    features: BTreeMap<String, bool>,
}

impl SelectionContext {
    pub fn new(project: Selection, tester: Selection) -> Self {
        Self {
            project,
            tester,
            features: BTreeMap::new(),
        }
    }

    pub fn all() -> Self {
        Self::new(Selection::All, Selection::All)
    }

    pub fn with_feature(mut self, feature: &str, enabled: bool) -> Self {
        self.features.insert(feature.trim().to_lowercase(), enabled);
        self
    }

    /// `None` when the flag was never supplied.
    pub fn feature(&self, feature: &str) -> Option<bool> {
        self.features.get(&feature.trim().to_lowercase()).copied()
    }

    pub fn features(&self) -> &BTreeMap<String, bool> {
        &self.features
    }

    /// Validates command-line choices against the vocabulary the rules were built from.
    ///
    /// Project and tester values are canonicalised to their vocabulary spelling;
    /// feature flags take the form `NAME=true` / `NAME=false`.
    pub fn from_choices(
        rules: &RuleSet,
        project: &str,
        tester: &str,
        features: &[String],
    ) -> Result<Self, ChecklistError> {
        let project = choose("project", project, rules.project_extractor())?;
        let tester = choose("tester", tester, rules.tester_extractor())?;
        let mut context = Self::new(project, tester);

        for raw in features {
            let (name, value) = raw
                .split_once('=')
                .ok_or_else(|| ChecklistError::InvalidFeatureFlag(raw.clone()))?;
            let enabled = parse_flag(value)
                .ok_or_else(|| ChecklistError::InvalidFeatureFlag(raw.clone()))?;
            let Some(feature) = rules.canonical_feature(name) else {
                return Err(ChecklistError::UnknownSelection {
                    kind: "feature",
                    value: name.trim().to_string(),
                    allowed: rules.feature_names().map(ToOwned::to_owned).collect(),
                });
            };
            context = context.with_feature(feature, enabled);
        }

        Ok(context)
    }
}

fn choose(
    kind: &'static str,
    value: &str,
    extractor: &TagExtractor,
) -> Result<Selection, ChecklistError> {
    if value.trim().eq_ignore_ascii_case(WILDCARD) {
        return Ok(Selection::All);
    }

    extractor
        .canonical(value)
        .map(|term| Selection::Only(term.to_string()))
        .ok_or_else(|| ChecklistError::UnknownSelection {
            kind,
            value: value.trim().to_string(),
            allowed: extractor
                .terms()
                .chain(std::iter::once(WILDCARD))
                .map(ToOwned::to_owned)
                .collect(),
        })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
