use super::*;

/// How a confirmation names its row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowRef {
    /// Zero-based data row index.
    Position(usize),
    /// Every undecided main point carrying this serial.
    Serial(String),
}

/// Undecided keys the user confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmationMap {
    confirmed: HashSet<PointKey>,
    ignored: Vec<RowRef>,
}

impl ConfirmationMap {
    /// Resolves references against `resolution`.
    ///
    /// A key counts as confirmed when any reference to it is `true`, so the
    /// result does not depend on entry order. References that do not name an
    /// undecided main point are kept aside in [`ConfirmationMap::ignored`].
    pub fn build<I>(resolution: &Resolution, entries: I) -> Self
    where
        I: IntoIterator<Item = (RowRef, bool)>,
    {
        let mut map = Self::default();

        for (reference, confirmed) in entries {
            let keys = undecided_keys_for(resolution, &reference);
            if keys.is_empty() {
                map.ignored.push(reference);
                continue;
            }
            if confirmed {
                map.confirmed.extend(keys);
            }
        }

        map
    }

    pub fn is_confirmed(&self, key: &PointKey) -> bool {
        self.confirmed.contains(key)
    }

    pub fn confirmed_count(&self) -> usize {
        self.confirmed.len()
    }

    pub fn ignored(&self) -> &[RowRef] {
        &self.ignored
    }
}

fn undecided_keys_for(resolution: &Resolution, reference: &RowRef) -> Vec<PointKey> {
    let rows = resolution.rows();
    match reference {
        RowRef::Position(position) => rows
            .get(*position)
            .filter(|row| row.annotated.row.position == *position)
            .filter(|row| row.is_undecided_main_point())
            .and_then(|row| row.annotated.key())
            .into_iter()
            .collect(),
        RowRef::Serial(serial) => {
            let serial = serial.trim();
            rows.iter()
                .filter(|row| row.is_undecided_main_point())
                .filter(|row| row.annotated.row.serial.as_deref() == Some(serial))
                .filter_map(|row| row.annotated.key())
                .collect()
        }
    }
}

/// Final relevance for every row, in row order.
///
/// Only undecided keys can change: confirmed ones become `Confirmed`, the rest
/// stay `NotApplicable`. Sub-points follow their key.
pub fn merge(resolution: &Resolution, confirmations: &ConfirmationMap) -> Vec<Relevance> {
    resolution
        .rows()
        .iter()
        .map(|row| {
            let (Some(verdict), Some(key)) = (&row.verdict, row.annotated.key()) else {
                return Relevance::Applicable;
            };
            match verdict {
                Verdict::Undecided if confirmations.is_confirmed(&key) => Relevance::Confirmed,
                other => other.initial_relevance(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSection<'a> {
    pub heading: &'a str,
    pub points: Vec<&'a ResolvedRow>,
}

/// Undecided main points in file order, grouped by section heading in order
/// of first appearance.
///
/// Points without a description and repeated keys are skipped; the first
/// main point of a key stands for the whole group.
pub fn pending_sections(resolution: &Resolution) -> Vec<PendingSection<'_>> {
    let mut sections = Vec::<PendingSection<'_>>::new();
    let mut section_index = HashMap::<&str, usize>::new();
    let mut seen_keys = HashSet::<PointKey>::new();

    for row in resolution.rows() {
        if !row.is_undecided_main_point() || row.annotated.row.description.is_empty() {
            continue;
        }
        let Some(key) = row.annotated.key() else {
            continue;
        };
        if !seen_keys.insert(key) {
            continue;
        }

        let heading = row.annotated.section.as_str();
        let index = *section_index.entry(heading).or_insert_with(|| {
            sections.push(PendingSection {
                heading,
                points: Vec::new(),
            });
            sections.len() - 1
        });
        sections[index].points.push(row);
    }

    sections
}
