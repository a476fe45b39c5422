//! Diagnostics for hand-edited YAML documents (project info, config)

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A YAML document that failed to parse, pointing at the offending spot
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(pft::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl YamlSyntaxError {
    /// Build from a serde_yml error and the text it was parsing
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Convert a 1-based line/column to a byte offset, clamped to the source
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();

    let line_text = source[line_start.min(source.len())..]
        .split('\n')
        .next()
        .unwrap_or("");

    let within = line_text
        .char_indices()
        .nth(column.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(line_text.len());

    (line_start + within).min(source.len())
}

/// Suggestions for the mistakes people make editing project documents
fn generate_help(message: &str) -> Option<String> {
    let msg = message.to_lowercase();

    if msg.contains("tab") {
        return Some("YAML indentation uses spaces, not tabs.".to_string());
    }
    if msg.contains("duplicate") {
        return Some("Each field may appear only once.".to_string());
    }
    if msg.contains("mapping values are not allowed") || msg.contains("unexpected ':'") {
        return Some(
            "Quote values that contain a colon, e.g. street: \"Suite 4: Rear\"".to_string(),
        );
    }
    if msg.contains("unknown variant") {
        return Some("Project type must be one of CAD, Revit or Generic.".to_string());
    }
    if msg.contains("yyyy.nnn") || msg.contains("delimiter") || msg.contains("floating point") {
        return Some("Project numbers are written as YYYY.NNN, e.g. \"2024.003\".".to_string());
    }
    if msg.contains("expected block end") {
        return Some("Check the indentation of the nested fields.".to_string());
    }

    None
}
