use csv::{ReaderBuilder, Trim};

/// Reader configuration shared by every table in the feed.
///
/// A `"` toggles the quoted state, `""` inside a quoted field is a literal
/// quote and only unquoted commas separate fields. Rows with a different
/// field count than the header are still yielded so a single bad row can be
/// skipped by the caller instead of failing the table.
pub fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(b',')
        .quote(b'"')
        .double_quote(true)
        .flexible(true)
        .trim(Trim::Headers);
    builder
}

/// Splits a single delimited line into its fields.
pub fn split_fields(line: &str) -> Vec<String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return vec![String::new()];
    }
    let mut reader = reader_builder()
        .has_headers(false)
        .from_reader(line.as_bytes());
    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(str::to_string).collect(),
        _ => vec![String::new()],
    }
}
