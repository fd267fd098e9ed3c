use super::*;
use super::tags::whole_word_pattern;

#[derive(Debug, Clone)]
struct FeatureGateMatcher {
    feature: String,
    keywords: TagExtractor,
}

/// Compiled form of a [`Vocabulary`].
#[derive(Debug, Clone)]
pub struct RuleSet {
    projects: TagExtractor,
    testers: TagExtractor,
    feature_gates: Vec<FeatureGateMatcher>,
    restricted: Vec<Regex>,
}

/// Values offered to the user for one sheet: every term seen in it, then the wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionOptions {
    pub projects: Vec<String>,
    pub testers: Vec<String>,
    pub features: Vec<String>,
}

impl SelectionOptions {
    pub fn default_project(&self) -> &str {
        first_choice(&self.projects)
    }

    pub fn default_tester(&self) -> &str {
        first_choice(&self.testers)
    }
}

/// The wildcard is listed last, so it is only the default when nothing was found.
fn first_choice(values: &[String]) -> &str {
    values.first().map(String::as_str).unwrap_or(WILDCARD)
}

impl RuleSet {
    pub fn new(vocabulary: &Vocabulary) -> Result<Self> {
        let projects = TagExtractor::new(&vocabulary.projects, &vocabulary.suppression_phrases)
            .context("failed to build project matcher")?;
        let testers = TagExtractor::new(&vocabulary.testers, &vocabulary.suppression_phrases)
            .context("failed to build tester matcher")?;

        let mut feature_gates = Vec::with_capacity(vocabulary.feature_gates.len());
        for gate in &vocabulary.feature_gates {
            let keywords = TagExtractor::new(&gate.keywords, &vocabulary.suppression_phrases)
                .with_context(|| format!("failed to build keyword matcher for {}", gate.feature))?;
            feature_gates.push(FeatureGateMatcher {
                feature: gate.feature.trim().to_lowercase(),
                keywords,
            });
        }

        let mut restricted = Vec::with_capacity(vocabulary.restricted_phrases.len());
        for phrase in &vocabulary.restricted_phrases {
            let phrase = phrase.trim();
            if phrase.is_empty() {
                continue;
            }
            let pattern = Regex::new(&format!("(?i){}", whole_word_pattern(phrase)))
                .with_context(|| format!("failed to compile restricted phrase regex for '{phrase}'"))?;
            restricted.push(pattern);
        }

        Ok(Self {
            projects,
            testers,
            feature_gates,
            restricted,
        })
    }

    pub fn project_extractor(&self) -> &TagExtractor {
        &self.projects
    }

    pub fn tester_extractor(&self) -> &TagExtractor {
        &self.testers
    }

    pub fn project_tags(&self, text: &str) -> BTreeSet<String> {
        self.projects.extract(text)
    }

    pub fn tester_tags(&self, text: &str) -> BTreeSet<String> {
        self.testers.extract(text)
    }

    /// Features whose keywords appear unsuppressed in `text`.
    pub fn triggered_features<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.feature_gates
            .iter()
            .filter(move |gate| gate.keywords.matches_any(text))
            .map(|gate| gate.feature.as_str())
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.feature_gates.iter().map(|gate| gate.feature.as_str())
    }

    pub fn canonical_feature(&self, name: &str) -> Option<&str> {
        let name = name.trim().to_lowercase();
        self.feature_names().find(|feature| *feature == name)
    }

    /// True when the text limits itself to an audience ("QA only") and so
    /// cannot be treated as generic.
    pub fn is_restricted(&self, text: &str) -> bool {
        self.restricted.iter().any(|pattern| pattern.is_match(text))
    }

    pub fn annotate(&self, rows: &[ChecklistRow]) -> Vec<AnnotatedRow> {
        let sections = assign_sections(rows);

        rows.iter()
            .zip(sections)
            .map(|(row, section)| {
                let serial = row.serial.as_deref();
                AnnotatedRow {
                    row: row.clone(),
                    section,
                    base_serial: serial.map(base_of),
                    is_main_point: serial.is_some_and(is_main_point),
                    project_tags: self.project_tags(&row.description),
                    tester_tags: self.tester_tags(&row.description),
                }
            })
            .collect()
    }

    pub fn selection_options(&self, rows: &[AnnotatedRow]) -> SelectionOptions {
        let projects = rows
            .iter()
            .flat_map(|row| row.project_tags.iter().cloned())
            .collect::<BTreeSet<String>>();
        let testers = rows
            .iter()
            .flat_map(|row| row.tester_tags.iter().cloned())
            .collect::<BTreeSet<String>>();

        SelectionOptions {
            projects: with_wildcard(projects),
            testers: with_wildcard(testers),
            features: self.feature_names().map(ToOwned::to_owned).collect(),
        }
    }
}

fn with_wildcard(values: BTreeSet<String>) -> Vec<String> {
    values
        .into_iter()
        .chain(std::iter::once(WILDCARD.to_string()))
        .collect()
}
