//! Renders the collection for people and spreadsheets.

use std::{fmt::Write as _, str::FromStr};

use csv::{QuoteStyle, WriterBuilder};
use serde_json::Value;
use thiserror::Error;

use crate::record::McqRecord;

/// Output shape for `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Pretty-printed JSON array, the same shape as the collection file.
    #[default]
    Json,
    /// One CSV row per record.
    Csv,
    /// Human-readable blocks.
    Readable,
}

/// Unrecognized export format name.
#[derive(Debug, Error)]
#[error("unknown export format `{0}` (expected json, csv or readable)")]
pub struct UnknownFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "readable" => Ok(Self::Readable),
            _ => Err(UnknownFormat(raw.to_string())),
        }
    }
}

/// Failures while rendering an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// JSON encoding failed.
    #[error("encoding JSON")]
    Json(#[from] serde_json::Error),
    /// CSV encoding failed.
    #[error("encoding CSV")]
    Csv(#[from] csv::Error),
    /// The CSV buffer was not valid UTF-8.
    #[error("CSV output is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

const CSV_HEADER: [&str; 6] = [
    "id",
    "question",
    "options",
    "correctAnswer",
    "explanation",
    "difficulty",
];

/// Renders the collection in the requested format.
pub fn render(records: &[McqRecord], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        ExportFormat::Csv => render_csv(records),
        ExportFormat::Readable => Ok(render_readable(records)),
    }
}

/// Plain text of an opaque field: strings unwrapped, other JSON as written.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

// Text columns are always quoted; the id column is numeric and never is.
fn render_csv(records: &[McqRecord]) -> Result<String, ExportError> {
    let mut header = CSV_HEADER.join(",");
    header.push('\n');
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(header.into_bytes());
    for record in records {
        let options = match record.options.as_ref().filter(|options| !options.is_null()) {
            Some(options) => serde_json::to_string(options)?,
            None => "{}".to_string(),
        };
        writer.write_record([
            record.id.to_string(),
            record.question.clone(),
            options,
            cell(record.correct_answer.as_ref()),
            cell(record.explanation.as_ref()),
            cell(record.difficulty.as_ref()),
        ])?;
    }
    let buffer = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8(buffer)?)
}

fn render_readable(records: &[McqRecord]) -> String {
    let mut out = String::new();
    for record in records {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "\nMCQ #{}:", record.id);
        let _ = writeln!(out, "Q: {}", record.question);
        out.push_str("Options:\n");
        for (label, text) in record.option_map().into_iter().flatten() {
            let _ = writeln!(out, "  {label}: {}", cell(Some(text)));
        }
        let answer = cell(record.correct_answer.as_ref());
        let _ = writeln!(
            out,
            "Answer: {}",
            if answer.is_empty() { "-" } else { answer.as_str() }
        );
        if let Some(explanation) = record.explanation_text() {
            let _ = writeln!(out, "Explanation: {explanation}");
        }
        out.push_str(&"-".repeat(50));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<McqRecord> {
        let mut record = McqRecord::new(1, "Which \"organ\" filters blood?")
            .with_option("A", "Kidney")
            .with_option("B", "Lung")
            .with_answer("A")
            .with_explanation("Nephrons filter plasma.");
        record.difficulty = Some(json!("easy"));
        vec![record, McqRecord::new(2, "Bare question")]
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn csv_quotes_text_columns() {
        let csv = render(&sample(), ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER.join(","));
        assert_eq!(
            lines[1],
            r#"1,"Which ""organ"" filters blood?","{""A"":""Kidney"",""B"":""Lung""}","A","Nephrons filter plasma.","easy""#
        );
        assert!(lines[2].starts_with(r#"2,"Bare question","{}","#));
    }

    #[test]
    fn csv_cells_with_separators_stay_in_one_column() {
        let mut record = McqRecord::new(7, "Pick one, any one")
            .with_option("A", "x")
            .with_answer("A\nB");
        record.difficulty = Some(json!("hard, revised"));
        let csv = render(&[record], ExportFormat::Csv).unwrap();

        let mut reader = csv::ReaderBuilder::new().from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 6);
        assert_eq!(&rows[0][0], "7");
        assert_eq!(&rows[0][1], "Pick one, any one");
        assert_eq!(&rows[0][3], "A\nB");
        assert_eq!(&rows[0][5], "hard, revised");
    }

    #[test]
    fn non_string_metadata_is_written_as_json() {
        let mut record = McqRecord::new(3, "q");
        record.difficulty = Some(json!(2));
        record.options = Some(json!(["a", "b"]));
        let csv = render(&[record], ExportFormat::Csv).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with(r#"3,"q","[""a"",""b""]","#));
        assert!(row.ends_with(",2"));
    }

    #[test]
    fn readable_blocks_list_options_in_order() {
        let text = render(&sample(), ExportFormat::Readable).unwrap();
        assert!(text.contains("MCQ #1:\nQ: Which \"organ\" filters blood?\nOptions:\n  A: Kidney\n  B: Lung\nAnswer: A\nExplanation: Nephrons filter plasma.\n"));
        assert!(text.contains("MCQ #2:\nQ: Bare question\nOptions:\nAnswer: -\n"));
        assert_eq!(text.matches(&"-".repeat(50)).count(), 2);
    }

    #[test]
    fn json_matches_collection_shape() {
        let json = render(&sample(), ExportFormat::Json).unwrap();
        let back: Vec<McqRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }
}
