use super::*;

/// Labels every row with the description of the nearest heading at or above it.
///
/// Rows ahead of the first heading get the empty label.
pub fn assign_sections(rows: &[ChecklistRow]) -> Vec<String> {
    rows.iter()
        .scan(String::new(), |current_heading, row| {
            if row.is_heading() {
                *current_heading = row.description.clone();
            }
            Some(current_heading.clone())
        })
        .collect()
}
