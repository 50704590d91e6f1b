//! Date normalization for schedule ordering.

/// Key assigned to undated exams so they sort after every real date.
pub const UNDATED_KEY: &str = "9999-99-99";

/// Spellings that mean "no date set yet". Matched exactly, after trimming.
pub const DATE_SENTINELS: [&str; 5] = ["None", "-", "", "TBD", "null"];

/// Convert a human-entered date into a key that sorts lexicographically.
///
/// `DD.MM.YYYY` becomes `YYYY-MM-DD` (single-digit day or month fields are
/// padded). Sentinels become [`UNDATED_KEY`]. Anything else is returned
/// trimmed but otherwise unchanged, so it may sort oddly next to real dates.
pub fn sortable_date(raw: &str) -> String {
    let s = raw.trim();
    if DATE_SENTINELS.contains(&s) {
        return UNDATED_KEY.to_string();
    }

    let parts: Vec<&str> = s.split('.').collect();
    if let [day, month, year] = parts.as_slice() {
        if [day, month, year].iter().all(|p| is_numeric_field(p)) {
            return format!("{year}-{month:0>2}-{day:0>2}");
        }
    }

    s.to_string()
}

fn is_numeric_field(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// Render a raw YAML date scalar as display text. Absent dates show as `-`.
pub fn display_date(value: Option<&serde_yaml::Value>) -> String {
    use serde_yaml::Value;

    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| "-".to_string()),
    }
}
