use std::io::Write;
use std::ops::Range;
use std::path::PathBuf;

/// A config file as it was read from disk.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub file_path: PathBuf,
    pub content: String,
}

#[derive(Debug, Clone)]
pub enum Diagnostic {
    Warning(Warning),
    Error(Error),
}

#[derive(Debug, Clone)]
pub enum Warning {
    EmptyConfig { file_path: PathBuf },
}

#[derive(Debug, Clone)]
pub enum Error {
    Merge(MergeError),
    Validation(ValidationError),
    Load(LoadError),
}

/// The same field was set in more than one file.
#[derive(Debug, Clone)]
pub struct MergeError {
    pub field_path: String,
    pub message: String,
    pub conflicts: Vec<MergeConflictLocation>,
}

#[derive(Debug, Clone)]
pub struct MergeConflictLocation {
    pub file_path: PathBuf,
    pub span: Range<usize>,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field_path: String,
    pub message: String,
    pub span: Option<Range<usize>>,
    pub source: Option<SourceInfo>,
}

/// Reading or parsing a file failed before any merging could happen.
///
/// Errors are stored as strings so diagnostics stay `Clone`.
#[derive(Debug, Clone)]
pub enum LoadError {
    Io { path: PathBuf, error: String },
    Parse { path: PathBuf, error: String },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (headline, path, detail) = match self {
            LoadError::Io { path, error } => ("Failed to read config file", path, error),
            LoadError::Parse { path, error } => ("Failed to parse config file", path, error),
        };
        write!(
            f,
            "\x1b[31mError\x1b[0m: {}\n  ┌─ {}:1:1\n  │\n  = {}\n",
            headline,
            path.display(),
            detail.trim_end()
        )
    }
}

impl std::error::Error for LoadError {}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        matches!(self, Diagnostic::Error(_))
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Diagnostic::Warning(_))
    }
}

impl From<ValidationError> for Diagnostic {
    fn from(error: ValidationError) -> Self {
        Diagnostic::Error(Error::Validation(error))
    }
}

impl From<MergeError> for Diagnostic {
    fn from(error: MergeError) -> Self {
        Diagnostic::Error(Error::Merge(error))
    }
}

impl From<LoadError> for Diagnostic {
    fn from(error: LoadError) -> Self {
        Diagnostic::Error(Error::Load(error))
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format_diagnostics(std::slice::from_ref(self)))
    }
}

/// A batch of diagnostics, usable as an error value.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Diagnostics {
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format_diagnostics(&self.0))
    }
}

impl std::error::Error for Diagnostics {}

/// Render diagnostics the way a compiler would, using ariadne where a span is known.
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diagnostic in diagnostics {
        match diagnostic {
            Diagnostic::Warning(Warning::EmptyConfig { file_path }) => {
                write_plain(
                    &mut output,
                    "\x1b[33mWarning\x1b[0m: Empty configuration file",
                    &file_path.display().to_string(),
                    &format!(
                        "Config file '{}' is empty and has no effect",
                        file_path.display()
                    ),
                );
            }
            Diagnostic::Error(Error::Merge(merge_error)) => {
                write_merge_error(&mut output, merge_error);
            }
            Diagnostic::Error(Error::Validation(validation_error)) => {
                write_validation_error(&mut output, validation_error);
            }
            Diagnostic::Error(Error::Load(load_error)) => {
                write!(&mut output, "{}", load_error).ok();
            }
        }
    }

    String::from_utf8_lossy(&output).to_string()
}

fn write_plain(output: &mut Vec<u8>, headline: &str, location: &str, note: &str) {
    writeln!(output, "{}", headline).ok();
    writeln!(output, "  ┌─ {}:1:1", location).ok();
    writeln!(output, "  │").ok();
    writeln!(output, "  = {}", note).ok();
    writeln!(output).ok();
}

fn write_merge_error(output: &mut Vec<u8>, merge_error: &MergeError) {
    use ariadne::Color;
    use ariadne::Label;
    use ariadne::Report;
    use ariadne::ReportKind;
    use ariadne::Source;

    let Some(first) = merge_error.conflicts.first() else {
        write_plain(
            output,
            &format!(
                "\x1b[31mError\x1b[0m: Merge conflict in field '{}'",
                merge_error.field_path
            ),
            "<unknown>",
            &merge_error.message,
        );
        return;
    };

    let mut report = Report::build(
        ReportKind::Error,
        (first.file_path.to_string_lossy().to_string(), first.span.clone()),
    )
    .with_message(format!("Merge conflict in field '{}'", merge_error.field_path))
    .with_note(&merge_error.message);

    for (idx, conflict) in merge_error.conflicts.iter().enumerate() {
        let (label, color) = if idx == 0 {
            ("first definition here", Color::Red)
        } else {
            ("conflicts with this definition", Color::Yellow)
        };
        report = report.with_label(
            Label::new((
                conflict.file_path.to_string_lossy().to_string(),
                conflict.span.clone(),
            ))
            .with_message(label)
            .with_color(color),
        );
    }

    let report = report.finish();

    // One render per file; ariadne only resolves labels whose source is in the cache.
    let mut rendered = std::collections::HashSet::new();
    for conflict in &merge_error.conflicts {
        let file_id = conflict.file_path.to_string_lossy().to_string();
        if rendered.insert(file_id.clone()) {
            report
                .write((file_id, Source::from(conflict.content.clone())), &mut *output)
                .ok();
        }
    }
}

fn write_validation_error(output: &mut Vec<u8>, error: &ValidationError) {
    use ariadne::Color;
    use ariadne::Label;
    use ariadne::Report;
    use ariadne::ReportKind;
    use ariadne::Source;

    match (&error.span, &error.source) {
        (Some(span), Some(source)) => {
            let file_id = source.file_path.to_string_lossy().to_string();
            Report::build(ReportKind::Error, (file_id.clone(), span.clone()))
                .with_message(format!("Validation error in '{}'", error.field_path))
                .with_label(
                    Label::new((file_id.clone(), span.clone()))
                        .with_message(&error.message)
                        .with_color(Color::Red),
                )
                .finish()
                .write((file_id, Source::from(source.content.clone())), &mut *output)
                .ok();
        }
        _ => {
            let location = error
                .source
                .as_ref()
                .map(|s| s.file_path.display().to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            write_plain(
                output,
                &format!(
                    "\x1b[31mError\x1b[0m: Validation error in '{}'",
                    error.field_path
                ),
                &location,
                &error.message,
            );
        }
    }
}
