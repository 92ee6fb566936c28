//! Minimal CSV writer for report exports.

fn needs_quoting(field: &str) -> bool {
    field.contains([',', '"', '\n', '\r'])
}

pub fn field(value: &str) -> String {
    if needs_quoting(value) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Header line followed by one line per row, `\n` separated.
pub fn document<S: AsRef<str>>(header: &[&str], rows: &[Vec<S>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(row(header));
    lines.extend(rows.iter().map(|r| row(r)));
    lines.join("\n")
}
