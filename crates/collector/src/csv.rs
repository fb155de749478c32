//! CSV field quoting.
//!
//! A field is quoted only when it has to be: if it contains a comma, a double
//! quote, or a newline, the whole value is wrapped in double quotes and every
//! inner double quote is doubled. Everything else is written verbatim.

/// Separator used inside a single field that holds a list of participants.
pub const LIST_SEPARATOR: &str = ";";

/// Quotes one field value if necessary.
pub fn csv_value(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Renders one complete CSV line, terminated with `\n`.
pub fn csv_line<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = values
        .into_iter()
        .map(|v| csv_value(v.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Renders a header line from column names.
pub fn header_line(columns: &[&str]) -> String {
    csv_line(columns.iter().copied())
}

/// Deduplicates `values` keeping first-seen order and joins them with
/// [`LIST_SEPARATOR`].
pub fn join_unique<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        let value = value.as_ref();
        if !value.is_empty() && !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen.join(LIST_SEPARATOR)
}
