use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::{
    DEFAULT_DESCRIPTION_COLUMN, DEFAULT_RELEVANCE_COLUMN, DEFAULT_SERIAL_COLUMN, FilterArgs,
};
use crate::commands::checklist::{load_checklist, selection_from_args};
use crate::commands::resolve::source_record;
use crate::error::ChecklistError;
use crate::model::{
    ConfirmationManifest, FilterCounts, FilterRunManifest, RUN_MANIFEST_VERSION, SelectionRecord,
};
use crate::relevance::{ConfirmationMap, Relevance, RowRef, merge, resolve};
use crate::util::{now_utc_string, read_json, utc_compact_string, write_json_pretty};

pub fn run(args: FilterArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("filter-{}", utc_compact_string(started_ts));

    let mut checklist = load_checklist(&args.sheet)?;
    let context = selection_from_args(&checklist, &args.selection)?;
    let selection = SelectionRecord::from(&context);
    let resolution = resolve(&checklist.rules, &checklist.annotated, &context);
    let mut warnings = Vec::<String>::new();

    let mut entries = Vec::<(RowRef, bool)>::new();
    if let Some(path) = &args.confirmations_path {
        let manifest: ConfirmationManifest = read_json(path)?;
        if manifest.source.sha256 != checklist.sha256 {
            return Err(ChecklistError::SourceMismatch {
                expected: checklist.sha256.clone(),
                found: manifest.source.sha256,
            })
            .with_context(|| format!("cannot apply {}", path.display()));
        }
        if manifest.selection != selection {
            let message = format!(
                "confirmations were collected for {}, applying to {}",
                describe_selection(&manifest.selection),
                describe_selection(&selection)
            );
            warn!(path = %path.display(), "{message}");
            warnings.push(message);
        }
        entries.extend(confirmation_entries(&manifest));
    }
    entries.extend(
        args.confirm_serials
            .iter()
            .map(|serial| (RowRef::Serial(serial.trim().to_string()), true)),
    );

    let confirmations_supplied = entries.len();
    let confirmations = ConfirmationMap::build(&resolution, entries);
    for reference in confirmations.ignored() {
        let message = format!("confirmation {reference:?} does not name an undecided point");
        warn!("{message}");
        warnings.push(message);
    }

    let relevance = merge(&resolution, &confirmations);
    checklist
        .document
        .apply_relevance(&checklist.columns, &relevance);
    if args.relevant_first {
        checklist.document.move_relevant_first(&relevance);
    }

    let output_path = args
        .output_path
        .clone()
        .unwrap_or_else(|| default_output_path(&checklist.path, &selection.project));
    write_json_pretty(&output_path, &checklist.document)?;
    info!(path = %output_path.display(), "wrote filtered checklist");

    let counts = FilterCounts {
        resolution: resolution.stats(),
        confirmations_supplied,
        confirmations_ignored: confirmations.ignored().len(),
        confirmed_points: confirmations.confirmed_count(),
        applicable_rows: count(&relevance, Relevance::Applicable),
        not_applicable_rows: count(&relevance, Relevance::NotApplicable),
        confirmed_rows: count(&relevance, Relevance::Confirmed),
    };

    let manifest_path = args
        .manifest_path
        .clone()
        .unwrap_or_else(|| output_path.with_extension("manifest.json"));
    let manifest = FilterRunManifest {
        manifest_version: RUN_MANIFEST_VERSION,
        run_id,
        started_at,
        completed_at: now_utc_string(),
        command: render_filter_command(&args),
        source: source_record(&checklist),
        selection,
        confirmations_path: args
            .confirmations_path
            .as_ref()
            .map(|path| path.display().to_string()),
        output_path: output_path.display().to_string(),
        relevant_first: args.relevant_first,
        counts,
        warnings,
    };
    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote filter run manifest");
    info!(
        applicable = manifest.counts.applicable_rows,
        not_applicable = manifest.counts.not_applicable_rows,
        confirmed = manifest.counts.confirmed_rows,
        "filter completed"
    );

    Ok(())
}

fn confirmation_entries(manifest: &ConfirmationManifest) -> Vec<(RowRef, bool)> {
    manifest
        .sections
        .iter()
        .flat_map(|section| section.points.iter())
        .map(|point| (RowRef::Position(point.row), point.confirmed))
        .collect()
}

fn describe_selection(selection: &SelectionRecord) -> String {
    let mut parts = vec![
        format!("project={}", selection.project),
        format!("tester={}", selection.tester),
    ];
    parts.extend(
        selection
            .features
            .iter()
            .map(|(feature, enabled)| format!("{feature}={enabled}")),
    );
    parts.join(" ")
}

fn count(relevance: &[Relevance], wanted: Relevance) -> usize {
    relevance.iter().filter(|value| **value == wanted).count()
}

fn default_output_path(input: &Path, project: &str) -> PathBuf {
    input.with_file_name(format!("Checklist_{project}_AutoNA.json"))
}

pub(super) fn render_filter_command(args: &FilterArgs) -> String {
    let mut parts = vec![
        "checklist-filter".to_string(),
        "filter".to_string(),
        "--input".to_string(),
        args.sheet.input.display().to_string(),
    ];

    if let Some(path) = &args.sheet.vocabulary_path {
        parts.push("--vocabulary-path".to_string());
        parts.push(path.display().to_string());
    }
    for (flag, value, default) in [
        (
            "--serial-column",
            &args.sheet.serial_column,
            DEFAULT_SERIAL_COLUMN,
        ),
        (
            "--description-column",
            &args.sheet.description_column,
            DEFAULT_DESCRIPTION_COLUMN,
        ),
        (
            "--relevance-column",
            &args.sheet.relevance_column,
            DEFAULT_RELEVANCE_COLUMN,
        ),
    ] {
        if value != default {
            parts.push(flag.to_string());
            parts.push(value.clone());
        }
    }
    if let Some(project) = &args.selection.project {
        parts.push("--project".to_string());
        parts.push(project.clone());
    }
    if let Some(tester) = &args.selection.tester {
        parts.push("--tester".to_string());
        parts.push(tester.clone());
    }
    for feature in &args.selection.features {
        parts.push("--feature".to_string());
        parts.push(feature.clone());
    }
    if let Some(path) = &args.confirmations_path {
        parts.push("--confirmations-path".to_string());
        parts.push(path.display().to_string());
    }
    for serial in &args.confirm_serials {
        parts.push("--confirm".to_string());
        parts.push(serial.clone());
    }
    if let Some(path) = &args.output_path {
        parts.push("--output-path".to_string());
        parts.push(path.display().to_string());
    }
    if let Some(path) = &args.manifest_path {
        parts.push("--manifest-path".to_string());
        parts.push(path.display().to_string());
    }
    if args.relevant_first {
        parts.push("--relevant-first".to_string());
    }

    parts.join(" ")
}
