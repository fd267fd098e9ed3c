use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{SelectionArgs, SheetArgs};
use crate::relevance::{AnnotatedRow, RuleSet, SelectionContext};
use crate::sheet::{ChecklistColumns, SheetDocument, load_sheet};
use crate::util::sha256_file;
use crate::vocabulary::load_vocabulary;

/// A sheet loaded, validated and annotated, ready for resolution.
pub(crate) struct LoadedChecklist {
    pub path: PathBuf,
    pub sha256: String,
    pub document: SheetDocument,
    pub columns: ChecklistColumns,
    pub rules: RuleSet,
    pub annotated: Vec<AnnotatedRow>,
}

pub(crate) fn load_checklist(args: &SheetArgs) -> Result<LoadedChecklist> {
    let vocabulary = load_vocabulary(args.vocabulary_path.as_deref())?;
    let rules = RuleSet::new(&vocabulary)?;

    let document = load_sheet(&args.input)?;
    let columns = document
        .locate(&args.column_names())
        .with_context(|| format!("cannot classify {}", args.input.display()))?;
    let sha256 = sha256_file(&args.input)?;

    let rows = document.checklist_rows(&columns);
    let annotated = rules.annotate(&rows);

    info!(
        path = %args.input.display(),
        sheet = %document.sheet,
        rows = rows.len(),
        headings = rows.iter().filter(|row| row.is_heading()).count(),
        "loaded checklist"
    );

    Ok(LoadedChecklist {
        path: args.input.clone(),
        sha256,
        document,
        columns,
        rules,
        annotated,
    })
}

/// Omitted project or tester choices fall back to the first value `options` lists.
pub(crate) fn selection_from_args(
    checklist: &LoadedChecklist,
    args: &SelectionArgs,
) -> Result<SelectionContext> {
    let options = checklist.rules.selection_options(&checklist.annotated);
    let project = args
        .project
        .as_deref()
        .unwrap_or_else(|| options.default_project());
    let tester = args
        .tester
        .as_deref()
        .unwrap_or_else(|| options.default_tester());

    let context = SelectionContext::from_choices(&checklist.rules, project, tester, &args.features)
        .context("invalid selection")?;

    info!(
        project = %context.project.label(),
        tester = %context.tester.label(),
        features = ?context.features(),
        "selection resolved"
    );

    Ok(context)
}
