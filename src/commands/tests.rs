use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crate::cli::{FilterArgs, ResolveArgs, SelectionArgs, SheetArgs};
use crate::error::ChecklistError;
use crate::model::ConfirmationManifest;
use crate::util::read_json;

use super::{filter, resolve};

fn write_sheet(dir: &Path) -> PathBuf {
    let path = dir.join("schematic.json");
    let sheet = json!({
        "sheet": "SCHEMATIC",
        "columns": ["S.No", "Description", "Owner", "D1"],
        "rows": [
            [null, "Power", null, null],
            [1, "Check ground plane", "hw", null],
            [2, "For Xilinx only: use series termination", "hw", null],
            ["2.1", "Match stub lengths", "hw", null],
            [3, "Relay contact rating check", "hw", null],
            [null, "Load board", null, null],
            [4, "93K pogo pin keep-out", "test", null],
            [5, "Nvidia strapping review", "test", null]
        ]
    });
    fs::write(&path, serde_json::to_vec_pretty(&sheet).expect("serialize sheet"))
        .expect("write sheet");
    path
}

fn sheet_args(input: &Path) -> SheetArgs {
    SheetArgs {
        input: input.to_path_buf(),
        vocabulary_path: None,
        serial_column: "S.No".to_string(),
        description_column: "Description".to_string(),
        relevance_column: "D1".to_string(),
    }
}

fn selection_args() -> SelectionArgs {
    SelectionArgs {
        project: Some("intel".to_string()),
        tester: Some("T2K".to_string()),
        features: vec!["relays=false".to_string()],
    }
}

fn filter_args(input: &Path, output: &Path) -> FilterArgs {
    FilterArgs {
        sheet: sheet_args(input),
        selection: selection_args(),
        confirmations_path: None,
        confirm_serials: Vec::new(),
        output_path: Some(output.to_path_buf()),
        manifest_path: None,
        relevant_first: false,
    }
}

fn relevance_column(path: &Path) -> Vec<Value> {
    let sheet: Value = read_json(path).expect("read output sheet");
    sheet["rows"]
        .as_array()
        .expect("rows array")
        .iter()
        .map(|row| row[3].clone())
        .collect()
}

#[test]
fn resolve_then_filter_applies_confirmations() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_sheet(dir.path());
    let confirmations_path = dir.path().join("confirmations.json");

    resolve::run(ResolveArgs {
        sheet: sheet_args(&input),
        selection: selection_args(),
        confirmations_path: Some(confirmations_path.clone()),
    })
    .expect("resolve should succeed");

    let mut manifest: ConfirmationManifest =
        read_json(&confirmations_path).expect("confirmation manifest");
    assert_eq!(manifest.selection.project, "Intel");
    let headings = manifest
        .sections
        .iter()
        .map(|section| section.heading.as_str())
        .collect::<Vec<_>>();
    assert_eq!(headings, vec!["Power", "Load board"]);
    assert_eq!(manifest.sections[1].points.len(), 2);
    assert_eq!(manifest.sections[0].points[0].serial, "2");
    assert_eq!(manifest.sections[0].points[0].row, 2);

    manifest.sections[0].points[0].confirmed = true;
    fs::write(
        &confirmations_path,
        serde_json::to_vec_pretty(&manifest).expect("serialize manifest"),
    )
    .expect("rewrite manifest");

    let output = dir.path().join("out.json");
    let mut args = filter_args(&input, &output);
    args.confirmations_path = Some(confirmations_path);
    filter::run(args).expect("filter should succeed");

    assert_eq!(
        relevance_column(&output),
        vec![
            json!(""),
            json!(""),
            json!("Checked"),
            json!("Checked"),
            json!("NA"),
            json!(""),
            json!("NA"),
            json!("NA"),
        ]
    );

    let run_manifest: Value =
        read_json(&dir.path().join("out.manifest.json")).expect("run manifest");
    assert_eq!(run_manifest["counts"]["confirmed_rows"], 2);
    assert_eq!(run_manifest["counts"]["resolution"]["excluded_by_feature_flag"], 1);
}

#[test]
fn filter_without_confirmations_fails_closed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_sheet(dir.path());
    let output = dir.path().join("out.json");

    filter::run(filter_args(&input, &output)).expect("filter should succeed");

    let relevance = relevance_column(&output);
    assert_eq!(relevance[2], json!("NA"));
    assert_eq!(relevance[3], json!("NA"));
    assert!(!relevance.contains(&json!("Checked")));
}

#[test]
fn confirm_serial_flag_confirms_undecided_point() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_sheet(dir.path());
    let output = dir.path().join("out.json");

    let mut args = filter_args(&input, &output);
    args.confirm_serials = vec!["5".to_string(), "1".to_string()];
    filter::run(args).expect("filter should succeed");

    let relevance = relevance_column(&output);
    assert_eq!(relevance[1], json!(""));
    assert_eq!(relevance[7], json!("Checked"));

    let run_manifest: Value =
        read_json(&dir.path().join("out.manifest.json")).expect("run manifest");
    assert_eq!(run_manifest["counts"]["confirmations_ignored"], 1);
}

#[test]
fn filter_rejects_confirmations_for_another_sheet() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_sheet(dir.path());
    let confirmations_path = dir.path().join("confirmations.json");

    resolve::run(ResolveArgs {
        sheet: sheet_args(&input),
        selection: selection_args(),
        confirmations_path: Some(confirmations_path.clone()),
    })
    .expect("resolve should succeed");

    let mut sheet: Value = read_json(&input).expect("sheet");
    sheet["rows"][1][1] = json!("Check ground plane and stitching");
    fs::write(&input, serde_json::to_vec(&sheet).expect("serialize")).expect("rewrite sheet");

    let output = dir.path().join("out.json");
    let mut args = filter_args(&input, &output);
    args.confirmations_path = Some(confirmations_path);
    let err = filter::run(args).expect_err("hash mismatch should fail");

    assert!(matches!(
        err.downcast_ref::<ChecklistError>(),
        Some(ChecklistError::SourceMismatch { .. })
    ));
    assert!(!output.exists());
}

#[test]
fn missing_columns_abort_before_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("broken.json");
    fs::write(
        &input,
        serde_json::to_vec(&json!({
            "sheet": "SCHEMATIC",
            "columns": ["S.No", "Text"],
            "rows": [["1", "Check"]]
        }))
        .expect("serialize"),
    )
    .expect("write sheet");

    let output = dir.path().join("out.json");
    let err = filter::run(filter_args(&input, &output)).expect_err("structural error");

    match err.downcast_ref::<ChecklistError>() {
        Some(ChecklistError::MissingColumns { missing, .. }) => {
            assert_eq!(missing, &vec!["Description".to_string(), "D1".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn relevant_first_moves_not_applicable_rows_down() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_sheet(dir.path());
    let output = dir.path().join("out.json");

    let mut args = filter_args(&input, &output);
    args.relevant_first = true;
    filter::run(args).expect("filter should succeed");

    let relevance = relevance_column(&output);
    let first_na = relevance
        .iter()
        .position(|value| value == &json!("NA"))
        .expect("some rows are not applicable");
    assert!(relevance[first_na..].iter().all(|value| value == &json!("NA")));
}

#[test]
fn render_filter_command_includes_optional_flags() {
    let mut args = filter_args(Path::new("sheet.json"), Path::new("custom/out.json"));
    args.sheet.vocabulary_path = Some(PathBuf::from("vocab.json"));
    args.sheet.relevance_column = "D2".to_string();
    args.confirmations_path = Some(PathBuf::from("confirmations.json"));
    args.confirm_serials = vec!["7".to_string()];
    args.manifest_path = Some(PathBuf::from("run.json"));
    args.relevant_first = true;

    let command = filter::render_filter_command(&args);
    assert_eq!(
        command,
        "checklist-filter filter --input sheet.json --vocabulary-path vocab.json \
         --relevance-column D2 --project intel --tester T2K --feature relays=false \
         --confirmations-path confirmations.json --confirm 7 \
         --output-path custom/out.json --manifest-path run.json --relevant-first"
    );
}

#[test]
fn render_filter_command_omits_defaults() {
    let mut args = filter_args(Path::new("sheet.json"), Path::new("out.json"));
    args.output_path = None;
    args.selection = SelectionArgs {
        project: Some("Intel".to_string()),
        tester: None,
        features: Vec::new(),
    };

    assert_eq!(
        filter::render_filter_command(&args),
        "checklist-filter filter --input sheet.json --project Intel"
    );
}

#[test]
fn omitted_tester_defaults_to_first_tester_in_sheet() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_sheet(dir.path());
    let output = dir.path().join("out.json");

    let mut args = filter_args(&input, &output);
    args.selection = SelectionArgs {
        project: Some("Intel".to_string()),
        tester: None,
        features: Vec::new(),
    };
    filter::run(args).expect("filter should succeed");

    let relevance = relevance_column(&output);
    assert_eq!(relevance[2], json!("NA"));
    assert_eq!(relevance[3], json!("NA"));
    assert_eq!(relevance[4], json!(""));
    assert_eq!(relevance[6], json!(""));

    let run_manifest: Value =
        read_json(&dir.path().join("out.manifest.json")).expect("run manifest");
    assert_eq!(run_manifest["selection"]["project"], "Intel");
    assert_eq!(run_manifest["selection"]["tester"], "93K");
}

#[test]
fn selection_mismatch_warning_names_feature_flags() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_sheet(dir.path());
    let confirmations_path = dir.path().join("confirmations.json");

    resolve::run(ResolveArgs {
        sheet: sheet_args(&input),
        selection: selection_args(),
        confirmations_path: Some(confirmations_path.clone()),
    })
    .expect("resolve should succeed");

    let output = dir.path().join("out.json");
    let mut args = filter_args(&input, &output);
    args.confirmations_path = Some(confirmations_path);
    args.selection.features = vec!["relays=true".to_string()];
    filter::run(args).expect("filter should succeed");

    let run_manifest: Value =
        read_json(&dir.path().join("out.manifest.json")).expect("run manifest");
    let warnings = run_manifest["warnings"].as_array().expect("warnings");
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0],
        "confirmations were collected for project=Intel tester=T2K relays=false, \
         applying to project=Intel tester=T2K relays=true"
    );
}
