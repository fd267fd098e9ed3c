use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::cli::ResolveArgs;
use crate::commands::checklist::{LoadedChecklist, load_checklist, selection_from_args};
use crate::model::{
    CONFIRMATION_MANIFEST_VERSION, ConfirmationManifest, ConfirmationPoint, ConfirmationSection,
    SelectionRecord, SourceRecord,
};
use crate::relevance::{Resolution, SelectionContext, pending_sections, resolve};
use crate::util::{now_utc_string, write_json_pretty};

pub fn run(args: ResolveArgs) -> Result<()> {
    let checklist = load_checklist(&args.sheet)?;
    let context = selection_from_args(&checklist, &args.selection)?;
    let resolution = resolve(&checklist.rules, &checklist.annotated, &context);

    let stats = resolution.stats();
    info!(
        main_points = stats.main_points,
        relevant = stats.relevant,
        excluded_by_feature_flag = stats.excluded_by_feature_flag,
        excluded_by_section_gate = stats.excluded_by_section_gate,
        undecided = stats.undecided,
        "resolution completed"
    );

    let manifest = build_confirmation_manifest(&checklist, &context, &resolution);
    let manifest_path = args
        .confirmations_path
        .unwrap_or_else(|| default_confirmations_path(&checklist.path));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(
        path = %manifest_path.display(),
        sections = manifest.sections.len(),
        points = manifest.sections.iter().map(|section| section.points.len()).sum::<usize>(),
        "wrote confirmation manifest"
    );

    Ok(())
}

pub(crate) fn source_record(checklist: &LoadedChecklist) -> SourceRecord {
    SourceRecord {
        path: checklist.path.display().to_string(),
        sheet: checklist.document.sheet.clone(),
        sha256: checklist.sha256.clone(),
    }
}

pub(crate) fn build_confirmation_manifest(
    checklist: &LoadedChecklist,
    context: &SelectionContext,
    resolution: &Resolution,
) -> ConfirmationManifest {
    let sections = pending_sections(resolution)
        .into_iter()
        .map(|section| ConfirmationSection {
            heading: section.heading.to_string(),
            points: section
                .points
                .into_iter()
                .map(|row| ConfirmationPoint {
                    row: row.annotated.row.position,
                    serial: row.annotated.row.serial.clone().unwrap_or_default(),
                    description: row.annotated.row.description.clone(),
                    confirmed: false,
                })
                .collect(),
        })
        .collect();

    ConfirmationManifest {
        manifest_version: CONFIRMATION_MANIFEST_VERSION,
        generated_at: now_utc_string(),
        source: source_record(checklist),
        selection: SelectionRecord::from(context),
        sections,
    }
}

fn default_confirmations_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("checklist");
    input.with_file_name(format!("{stem}_confirmations.json"))
}
