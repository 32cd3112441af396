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

//! Root-relative paths such as `$.items[2].id` or `$["a.b"][0]`.
//!
//! Simple keys use dot notation. Keys that are empty or contain `.` or `[`
//! would not survive a round trip through dot notation, so they are written
//! in bracket form with double quotes, escaping `\` and `"`. The parser also
//! accepts single-quoted bracket keys.

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::value::{Value, ValueExt};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(key) => Some(key),
            Segment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Index(index) => Some(*index),
            Segment::Key(_) => None,
        }
    }

    /// The container kind this segment descends into.
    pub fn expects(&self) -> &'static str {
        match self {
            Segment::Key(_) => "object",
            Segment::Index(_) => "array",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(index) => write!(f, "[{}]", index),
            Segment::Key(key) if needs_brackets(key) => {
                write!(f, "[\"")?;
                for ch in key.chars() {
                    if ch == '\\' || ch == '"' {
                        write!(f, "\\")?;
                    }
                    write!(f, "{}", ch)?;
                }
                write!(f, "\"]")
            }
            Segment::Key(key) => write!(f, ".{}", key),
        }
    }
}

fn needs_brackets(key: &str) -> bool {
    key.is_empty() || key.contains('.') || key.contains('[')
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn root() -> Self {
        Path { segments: vec![] }
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Path { segments }
    }

    pub fn parse(path: &str) -> Result<Self, Diagnostic> {
        let mut chars = path.char_indices().peekable();

        match chars.next() {
            Some((_, '$')) => {}
            _ => return Err(syntax_error(path, 0, "paths must start with '$'")),
        }

        let mut segments = Vec::new();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '.' => {
                    let mut key = String::new();
                    while let Some(&(_, c)) = chars.peek() {
                        if c == '.' || c == '[' {
                            break;
                        }
                        key.push(c);
                        chars.next();
                    }
                    if key.is_empty() {
                        return Err(syntax_error(path, pos + 1, "expected a key after '.'"));
                    }
                    segments.push(Segment::Key(key));
                }
                '[' => match chars.peek().map(|&(_, c)| c) {
                    Some(quote @ ('"' | '\'')) => {
                        chars.next();
                        let mut key = String::new();
                        let mut closed = false;
                        while let Some((_, c)) = chars.next() {
                            if c == '\\' {
                                match chars.next() {
                                    Some((_, escaped)) => key.push(escaped),
                                    None => {
                                        return Err(syntax_error(
                                            path,
                                            path.len(),
                                            "found a trailing backslash in a quoted key",
                                        ))
                                    }
                                }
                            } else if c == quote {
                                closed = true;
                                break;
                            } else {
                                key.push(c);
                            }
                        }
                        if !closed {
                            return Err(syntax_error(path, pos, "this quoted key is never closed"));
                        }
                        match chars.next() {
                            Some((_, ']')) => {}
                            other => {
                                return Err(syntax_error(
                                    path,
                                    other.map_or(path.len(), |(p, _)| p),
                                    "expected ']' after the quoted key",
                                ))
                            }
                        }
                        segments.push(Segment::Key(key));
                    }
                    _ => {
                        let mut digits = String::new();
                        while let Some(&(_, c)) = chars.peek() {
                            if !c.is_ascii_digit() {
                                break;
                            }
                            digits.push(c);
                            chars.next();
                        }
                        if digits.is_empty() {
                            return Err(syntax_error(
                                path,
                                pos + 1,
                                "expected a non-negative index or a quoted key after '['",
                            ));
                        }
                        if digits.len() > 1 && digits.starts_with('0') {
                            return Err(syntax_error(
                                path,
                                pos + 1,
                                "array indices can't have leading zeros",
                            ));
                        }
                        let index = digits.parse::<usize>().map_err(|_| {
                            syntax_error(path, pos + 1, "this array index is too large")
                        })?;
                        match chars.next() {
                            Some((_, ']')) => {}
                            other => {
                                return Err(syntax_error(
                                    path,
                                    other.map_or(path.len(), |(p, _)| p),
                                    "expected ']' after the index",
                                ))
                            }
                        }
                        segments.push(Segment::Index(index));
                    }
                },
                _ => {
                    return Err(syntax_error(
                        path,
                        pos,
                        &format!("unexpected character '{}'", ch),
                    ))
                }
            }
        }

        Ok(Path { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn pop(&mut self) -> Option<Segment> {
        self.segments.pop()
    }

    pub fn child_key(&self, key: impl Into<String>) -> Path {
        let mut child = self.clone();
        child.push(Segment::Key(key.into()));
        child
    }

    pub fn child_index(&self, index: usize) -> Path {
        let mut child = self.clone();
        child.push(Segment::Index(index));
        child
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn parent(&self) -> Option<Path> {
        self.split_last().map(|(parent, _)| Path {
            segments: parent.to_vec(),
        })
    }

    pub fn split_last(&self) -> Option<(&[Segment], &Segment)> {
        self.segments
            .split_last()
            .map(|(last, parent)| (parent, last))
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    pub fn get<'a>(&self, value: &'a Value) -> Result<&'a Value, Diagnostic> {
        let mut current = value;

        for (depth, segment) in self.segments.iter().enumerate() {
            let at = &self.segments[..depth];
            current = match (segment, current) {
                (Segment::Key(key), Value::Object(obj)) => obj
                    .get(key)
                    .ok_or_else(|| key_not_found(at, key, DiagnosticCode::PathNotFound))?,
                (Segment::Index(index), Value::Array(arr)) => arr.get(*index).ok_or_else(|| {
                    index_out_of_bounds(at, *index, arr.len(), DiagnosticCode::PathNotFound)
                })?,
                _ => return Err(wrong_container(at, segment, current)),
            };
        }

        Ok(current)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Diagnostic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl Serialize for Path {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Path::parse(&raw).map_err(|diag| de::Error::custom(diag.description))
    }
}

pub(crate) fn format_segments(segments: &[Segment]) -> String {
    let mut out = String::from("$");
    for segment in segments {
        out.push_str(&segment.to_string());
    }
    out
}

fn syntax_error(path: &str, byte_pos: usize, reason: &str) -> Diagnostic {
    let column = path[..byte_pos.min(path.len())].chars().count();
    Diagnostic::fatal(
        DiagnosticCode::InvalidPathSyntax,
        format!("I couldn't parse the path '{}': {}.", path, reason),
    )
    .with_snippet(format!("{}\n{}^", path, " ".repeat(column)))
    .with_advice(
        "Paths start at '$' and descend with .key for object members and [index] for \
         array elements. Keys containing '.' or '[' go in brackets: $[\"a.b\"]"
            .to_string(),
    )
}

pub(crate) fn key_not_found(at: &[Segment], key: &str, code: DiagnosticCode) -> Diagnostic {
    Diagnostic::fatal(
        code,
        format!("I couldn't find the key '{}' inside {}", key, format_segments(at)),
    )
}

pub(crate) fn index_out_of_bounds(
    at: &[Segment],
    index: usize,
    len: usize,
    code: DiagnosticCode,
) -> Diagnostic {
    Diagnostic::fatal(
        code,
        format!(
            "I couldn't find index {} inside {} (array length is {})",
            index,
            format_segments(at),
            len
        ),
    )
}

pub(crate) fn wrong_container(at: &[Segment], segment: &Segment, found: &Value) -> Diagnostic {
    Diagnostic::fatal(
        DiagnosticCode::TypeMismatch,
        format!(
            "I can't descend into {} with '{}': I expected an {} but found {}",
            format_segments(at),
            segment,
            segment.expects(),
            found.type_name()
        ),
    )
}
