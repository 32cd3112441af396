// json-delta computes and applies structural deltas between JSON values
// Copyright (C) 2025  Peoples Grocers LLC
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//
// To purchase a license under different terms contact admin@peoplesgrocers.com
// To request changes, report bugs, or give user feedback contact
// marxism@peoplesgrocers.com
//

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Fatal,
    Warning,
    Info,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Fatal => write!(f, "error"),
            DiagnosticLevel::Warning => write!(f, "warning"),
            DiagnosticLevel::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    InvalidJson,
    FileNotFound,
    WriteFailed,

    UnknownDocumentType,
    UnsupportedVersion,
    MissingDocumentField,

    InvalidOperationJson,
    UnknownOperationType,
    WrongFieldCount,
    WrongFieldType,

    InvalidPathSyntax,
    PathNotFound,
    ParentPathNotFound,
    ArrayIndexOutOfBounds,
    RootRemoval,

    TypeMismatch,
    OldValueMismatch,

    MissingNewValue,
    DuplicateRemoval,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::InvalidJson => "E001",
            DiagnosticCode::FileNotFound => "E002",
            DiagnosticCode::WriteFailed => "E003",

            DiagnosticCode::UnknownDocumentType => "E010",
            DiagnosticCode::UnsupportedVersion => "E011",
            DiagnosticCode::MissingDocumentField => "E012",

            DiagnosticCode::InvalidOperationJson => "E020",
            DiagnosticCode::UnknownOperationType => "E021",
            DiagnosticCode::WrongFieldCount => "E022",
            DiagnosticCode::WrongFieldType => "E023",

            DiagnosticCode::InvalidPathSyntax => "E050",
            DiagnosticCode::PathNotFound => "E051",
            DiagnosticCode::ParentPathNotFound => "E052",
            DiagnosticCode::ArrayIndexOutOfBounds => "E053",
            DiagnosticCode::RootRemoval => "E054",

            DiagnosticCode::TypeMismatch => "E060",
            DiagnosticCode::OldValueMismatch => "E061",

            DiagnosticCode::MissingNewValue => "E070",
            DiagnosticCode::DuplicateRemoval => "E071",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DiagnosticCode::InvalidJson => "Invalid JSON",
            DiagnosticCode::FileNotFound => "File not found",
            DiagnosticCode::WriteFailed => "Write failed",

            DiagnosticCode::UnknownDocumentType => "Unknown document type",
            DiagnosticCode::UnsupportedVersion => "Unsupported version",
            DiagnosticCode::MissingDocumentField => "Missing required document field",

            DiagnosticCode::InvalidOperationJson => "Invalid operation JSON",
            DiagnosticCode::UnknownOperationType => "Unknown operation type",
            DiagnosticCode::WrongFieldCount => "Wrong field count",
            DiagnosticCode::WrongFieldType => "Wrong field type",

            DiagnosticCode::InvalidPathSyntax => "Invalid path syntax",
            DiagnosticCode::PathNotFound => "Path not found",
            DiagnosticCode::ParentPathNotFound => "Parent path not found",
            DiagnosticCode::ArrayIndexOutOfBounds => "Array index out of bounds",
            DiagnosticCode::RootRemoval => "Cannot remove the root",

            DiagnosticCode::TypeMismatch => "Type mismatch",
            DiagnosticCode::OldValueMismatch => "Old value mismatch",

            DiagnosticCode::MissingNewValue => "Missing new value",
            DiagnosticCode::DuplicateRemoval => "Duplicate removal",
        }
    }

    /// True for the codes a patch reports when an operation's path does not
    /// resolve against the value being patched.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            DiagnosticCode::PathNotFound
                | DiagnosticCode::ParentPathNotFound
                | DiagnosticCode::ArrayIndexOutOfBounds
                | DiagnosticCode::TypeMismatch
        )
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub filename: Option<String>,
    pub line_number: Option<usize>,
    pub column: Option<usize>,
    pub operation_index: Option<usize>,
    pub path: Option<String>,
    pub level: DiagnosticLevel,
    pub code: DiagnosticCode,
    pub description: String,
    pub code_snippet: Option<String>,
    pub advice: Option<String>,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, code: DiagnosticCode, description: String) -> Self {
        Self {
            filename: None,
            line_number: None,
            column: None,
            operation_index: None,
            path: None,
            level,
            code,
            description,
            code_snippet: None,
            advice: None,
        }
    }

    pub fn fatal(code: DiagnosticCode, description: String) -> Self {
        Self::new(DiagnosticLevel::Fatal, code, description)
    }

    pub fn with_location(mut self, filename: String, line_number: usize) -> Self {
        self.filename = Some(filename);
        self.line_number = Some(line_number);
        self
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_filename(mut self, filename: String) -> Self {
        self.filename = Some(filename);
        self
    }

    /// Records which operation of a delta produced this diagnostic.
    pub fn with_operation(mut self, index: usize) -> Self {
        self.operation_index = Some(index);
        self
    }

    pub fn with_path(mut self, path: String) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_snippet(mut self, snippet: String) -> Self {
        self.code_snippet = Some(snippet);
        self
    }

    pub fn with_advice(mut self, advice: String) -> Self {
        self.advice = Some(advice);
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.level == DiagnosticLevel::Fatal
    }

    pub fn is_navigation_error(&self) -> bool {
        self.code.is_navigation()
    }

    /// Turns a serde_json syntax error into a diagnostic pointing at the
    /// offending line of `text`.
    pub fn from_json_error(error: &serde_json::Error, text: &str) -> Self {
        let line = error.line();
        let mut diag = Self::fatal(
            DiagnosticCode::InvalidJson,
            format!("I couldn't parse this as JSON: {}", error),
        );
        if line > 0 {
            diag.line_number = Some(line);
            diag.column = Some(error.column());
            if let Some(source_line) = text.lines().nth(line - 1) {
                diag = diag.with_snippet(format!("{} | {}", line, source_line));
            }
        }
        diag
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(filename) = &self.filename {
            match (self.line_number, self.column) {
                (Some(line), Some(col)) => write!(f, "{}:{}:{} - ", filename, line, col)?,
                (Some(line), None) => write!(f, "{}:{} - ", filename, line)?,
                _ => write!(f, "{} - ", filename)?,
            }
        }

        if let Some(index) = self.operation_index {
            write!(f, "operation #{}", index)?;
            if let Some(path) = &self.path {
                write!(f, " at {}", path)?;
            }
            write!(f, " - ")?;
        } else if let Some(path) = &self.path {
            write!(f, "{} - ", path)?;
        }

        writeln!(
            f,
            "{} {}: {}",
            self.level,
            self.code.as_str(),
            self.code.title()
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.description)?;

        if let Some(snippet) = &self.code_snippet {
            writeln!(f)?;
            writeln!(f, "{}", snippet)?;
        }

        if let Some(advice) = &self.advice {
            writeln!(f)?;
            writeln!(f, "{}", advice)?;
        }

        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, diagnostics: I) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_fatal())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}
