use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChecklistError;
use crate::relevance::{ChecklistRow, Relevance};
use crate::util::read_json;

/// One exported checklist sheet: column names plus rows of raw cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetDocument {
    pub sheet: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub serial: String,
    pub description: String,
    pub relevance: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecklistColumns {
    pub serial: usize,
    pub description: usize,
    pub relevance: usize,
}

pub fn load_sheet(path: &Path) -> Result<SheetDocument> {
    read_json(path)
}

impl SheetDocument {
    /// Finds the required columns, reporting every missing one at once.
    pub fn locate(&self, names: &ColumnNames) -> Result<ChecklistColumns, ChecklistError> {
        let find = |name: &str| {
            self.columns
                .iter()
                .position(|column| column.trim() == name.trim())
        };

        let serial = find(&names.serial);
        let description = find(&names.description);
        let relevance = find(&names.relevance);

        match (serial, description, relevance) {
            (Some(serial), Some(description), Some(relevance)) => Ok(ChecklistColumns {
                serial,
                description,
                relevance,
            }),
            _ => {
                let missing = [
                    (serial, &names.serial),
                    (description, &names.description),
                    (relevance, &names.relevance),
                ]
                .into_iter()
                .filter(|(index, _)| index.is_none())
                .map(|(_, name)| name.clone())
                .collect();
                Err(ChecklistError::MissingColumns {
                    sheet: self.sheet.clone(),
                    missing,
                })
            }
        }
    }

    pub fn checklist_rows(&self, columns: &ChecklistColumns) -> Vec<ChecklistRow> {
        self.rows
            .iter()
            .enumerate()
            .map(|(position, cells)| {
                let serial = cells.get(columns.serial).and_then(cell_text);
                let description = cells
                    .get(columns.description)
                    .and_then(cell_text)
                    .unwrap_or_default();
                ChecklistRow::new(position, serial.as_deref(), &description)
            })
            .collect()
    }

    /// Overwrites the relevance column; every other cell is left as loaded.
    pub fn apply_relevance(&mut self, columns: &ChecklistColumns, relevance: &[Relevance]) {
        for (cells, value) in self.rows.iter_mut().zip(relevance) {
            if cells.len() <= columns.relevance {
                cells.resize(columns.relevance + 1, Value::Null);
            }
            cells[columns.relevance] = Value::String(value.marker().to_string());
        }
    }

    /// Stable reorder putting rows that are not `NotApplicable` first.
    pub fn move_relevant_first(&mut self, relevance: &[Relevance]) {
        let mut indexed = std::mem::take(&mut self.rows)
            .into_iter()
            .enumerate()
            .collect::<Vec<(usize, Vec<Value>)>>();
        indexed.sort_by_key(|(index, _)| {
            relevance.get(*index).copied() == Some(Relevance::NotApplicable)
        });
        self.rows = indexed.into_iter().map(|(_, cells)| cells).collect();
    }
}

/// Text of a cell, `None` for nulls and blank strings.
///
/// Integral numbers drop their fractional part so that a serial stored as
/// `12.0` reads back as `12`.
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                return Some(integer.to_string());
            }
            match number.as_f64() {
                Some(float) if float.is_finite() && float.fract() == 0.0 => {
                    Some(format!("{float:.0}"))
                }
                _ => Some(number.to_string()),
            }
        }
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn default_names() -> ColumnNames {
        ColumnNames {
            serial: "S.No".to_string(),
            description: "Description".to_string(),
            relevance: "D1".to_string(),
        }
    }

    fn document() -> SheetDocument {
        serde_json::from_value(json!({
            "sheet": "SCHEMATIC",
            "columns": ["S.No", "Description", "Owner", "D1"],
            "rows": [
                [null, "Power", null, null],
                [1.0, "Check ground plane", "hw", "old"],
                ["1.1", "Stitching vias", "hw"],
                ["nan", "Clocks", null, ""]
            ]
        }))
        .expect("document should deserialize")
    }

    #[test]
    fn locate_reports_all_missing_columns() {
        let mut sheet = document();
        sheet.columns = vec!["Serial".to_string(), "Description".to_string()];

        let err = sheet.locate(&default_names()).expect_err("columns are missing");
        match err {
            ChecklistError::MissingColumns { sheet, missing } => {
                assert_eq!(sheet, "SCHEMATIC");
                assert_eq!(missing, vec!["S.No", "D1"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn checklist_rows_normalise_cells() {
        let sheet = document();
        let columns = sheet.locate(&default_names()).expect("columns");
        let rows = sheet.checklist_rows(&columns);

        assert!(rows[0].is_heading());
        assert_eq!(rows[1].serial.as_deref(), Some("1"));
        assert_eq!(rows[2].serial.as_deref(), Some("1.1"));
        assert!(rows[3].is_heading());
        assert_eq!(rows[3].description, "Clocks");
    }

    #[test]
    fn apply_relevance_only_touches_relevance_column() {
        let mut sheet = document();
        let columns = sheet.locate(&default_names()).expect("columns");
        sheet.apply_relevance(
            &columns,
            &[
                Relevance::Applicable,
                Relevance::Confirmed,
                Relevance::NotApplicable,
                Relevance::Applicable,
            ],
        );

        assert_eq!(sheet.rows[1], vec![json!(1.0), json!("Check ground plane"), json!("hw"), json!("Checked")]);
        assert_eq!(sheet.rows[2], vec![json!("1.1"), json!("Stitching vias"), json!("hw"), json!("NA")]);
        assert_eq!(sheet.rows[3][3], json!(""));
    }

    #[test]
    fn move_relevant_first_is_stable() {
        let mut sheet = document();
        sheet.move_relevant_first(&[
            Relevance::NotApplicable,
            Relevance::Applicable,
            Relevance::NotApplicable,
            Relevance::Confirmed,
        ]);

        let descriptions = sheet
            .rows
            .iter()
            .map(|cells| cells[1].as_str().unwrap_or_default().to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            descriptions,
            vec!["Check ground plane", "Clocks", "Power", "Stitching vias"]
        );
    }

    #[test]
    fn cell_text_formats_scalars() {
        assert_eq!(cell_text(&json!(null)), None);
        assert_eq!(cell_text(&json!("  ")), None);
        assert_eq!(cell_text(&json!(12)), Some("12".to_string()));
        assert_eq!(cell_text(&json!(12.0)), Some("12".to_string()));
        assert_eq!(cell_text(&json!(12.5)), Some("12.5".to_string()));
        assert_eq!(cell_text(&json!(" 4.1 ")), Some("4.1".to_string()));
    }
}
