use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevantBy {
    Wildcard,
    ProjectMatch,
    TesterMatch,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcludedBy {
    FeatureFlag(String),
    SectionGate,
    OrphanSubPoint,
}

/// Initial decision for one `(section, base serial)` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Relevant(RelevantBy),
    Excluded(ExcludedBy),
    Undecided,
}

impl Verdict {
    /// Column value before any confirmation; undecided points fail closed.
    pub fn initial_relevance(&self) -> Relevance {
        match self {
            Self::Relevant(_) => Relevance::Applicable,
            Self::Excluded(_) | Self::Undecided => Relevance::NotApplicable,
        }
    }

    pub fn is_undecided(&self) -> bool {
        matches!(self, Self::Undecided)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Excluded(_) => 0,
            Self::Undecided => 1,
            Self::Relevant(_) => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRow {
    pub annotated: AnnotatedRow,
    /// `None` for section headings.
    pub verdict: Option<Verdict>,
}

impl ResolvedRow {
    pub fn is_undecided_main_point(&self) -> bool {
        self.annotated.is_main_point && self.verdict.as_ref().is_some_and(Verdict::is_undecided)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub rows: usize,
    pub headings: usize,
    pub main_points: usize,
    pub sub_points: usize,
    pub relevant: usize,
    pub excluded_by_feature_flag: usize,
    pub excluded_by_section_gate: usize,
    pub orphan_sub_points: usize,
    pub undecided: usize,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    rows: Vec<ResolvedRow>,
}

impl Resolution {
    pub fn rows(&self) -> &[ResolvedRow] {
        &self.rows
    }

    pub fn initial_relevance(&self) -> Vec<Relevance> {
        self.rows
            .iter()
            .map(|row| {
                row.verdict
                    .as_ref()
                    .map(Verdict::initial_relevance)
                    .unwrap_or(Relevance::Applicable)
            })
            .collect()
    }

    pub fn stats(&self) -> ResolutionStats {
        let mut stats = ResolutionStats {
            rows: self.rows.len(),
            ..ResolutionStats::default()
        };

        for row in &self.rows {
            let Some(verdict) = &row.verdict else {
                stats.headings += 1;
                continue;
            };

            if !row.annotated.is_main_point {
                stats.sub_points += 1;
                if matches!(verdict, Verdict::Excluded(ExcludedBy::OrphanSubPoint)) {
                    stats.orphan_sub_points += 1;
                }
                continue;
            }

            stats.main_points += 1;
            match verdict {
                Verdict::Relevant(_) => stats.relevant += 1,
                Verdict::Excluded(ExcludedBy::FeatureFlag(_)) => stats.excluded_by_feature_flag += 1,
                Verdict::Excluded(ExcludedBy::SectionGate) => stats.excluded_by_section_gate += 1,
                Verdict::Excluded(ExcludedBy::OrphanSubPoint) => {}
                Verdict::Undecided => stats.undecided += 1,
            }
        }

        stats
    }
}

#[derive(Debug, Clone)]
struct SectionTags {
    projects: BTreeSet<String>,
    testers: BTreeSet<String>,
}

impl SectionTags {
    fn is_generic(&self) -> bool {
        self.projects.is_empty() && self.testers.is_empty()
    }
}

/// Decides every main point once per key, then copies the key's verdict to
/// its sub-points.
///
/// Main points sharing a key collapse to the strongest verdict
/// (relevant, then undecided, then excluded).
pub fn resolve(rules: &RuleSet, rows: &[AnnotatedRow], context: &SelectionContext) -> Resolution {
    let mut section_tags = HashMap::<&str, SectionTags>::new();
    let mut points = HashMap::<PointKey, Verdict>::new();

    for row in rows.iter().filter(|row| row.is_main_point) {
        let Some(key) = row.key() else {
            continue;
        };
        let section = section_tags
            .entry(row.section.as_str())
            .or_insert_with(|| SectionTags {
                projects: rules.project_tags(&row.section),
                testers: rules.tester_tags(&row.section),
            });

        let verdict = evaluate_main_point(rules, row, section, context);
        match points.entry(key) {
            Entry::Occupied(mut slot) => {
                if verdict.rank() > slot.get().rank() {
                    slot.insert(verdict);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(verdict);
            }
        }
    }

    let resolved = rows
        .iter()
        .map(|row| {
            let verdict = row.key().map(|key| {
                points
                    .get(&key)
                    .cloned()
                    .unwrap_or(Verdict::Excluded(ExcludedBy::OrphanSubPoint))
            });
            ResolvedRow {
                annotated: row.clone(),
                verdict,
            }
        })
        .collect();

    Resolution { rows: resolved }
}

fn evaluate_main_point(
    rules: &RuleSet,
    row: &AnnotatedRow,
    section: &SectionTags,
    context: &SelectionContext,
) -> Verdict {
    let description = row.row.description.as_str();

    for feature in rules.triggered_features(description) {
        if context.feature(feature) == Some(false) {
            return Verdict::Excluded(ExcludedBy::FeatureFlag(feature.to_string()));
        }
    }

    if !section.is_generic()
        && !context.project.matches(&section.projects)
        && !context.tester.matches(&section.testers)
    {
        return Verdict::Excluded(ExcludedBy::SectionGate);
    }

    if context.project.is_wildcard() || context.tester.is_wildcard() {
        return Verdict::Relevant(RelevantBy::Wildcard);
    }
    if context.project.matches(&row.project_tags) {
        return Verdict::Relevant(RelevantBy::ProjectMatch);
    }
    if context.tester.matches(&row.tester_tags) {
        return Verdict::Relevant(RelevantBy::TesterMatch);
    }
    if row.is_generic() && !rules.is_restricted(description) {
        return Verdict::Relevant(RelevantBy::Generic);
    }

    Verdict::Undecided
}
