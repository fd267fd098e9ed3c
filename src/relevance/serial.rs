/// Trims a raw serial cell and drops values that mark an empty cell.
pub fn normalize_serial(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    Some(trimmed.to_string())
}

/// Leading run of digits of a serial, or the whole serial when it has none.
pub fn base_of(serial: &str) -> String {
    let trimmed = serial.trim();
    let digit_end = trimmed
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map(|(index, _)| index)
        .unwrap_or(trimmed.len());

    if digit_end == 0 {
        return trimmed.to_string();
    }
    trimmed[..digit_end].to_string()
}

pub fn is_main_point(serial: &str) -> bool {
    base_of(serial) == serial.trim()
}
