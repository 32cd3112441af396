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

//! Operation decoding with diagnostic collection.
//!
//! `Operation`'s own `Deserialize` is fine for programs exchanging deltas, but
//! a person editing a delta file by hand deserves better than "invalid
//! length 2". This decoder reads the same positional array form and records
//! what was wrong at which position (codes, advice) instead of stopping at
//! the first serde error. The caller attaches the operation index.

use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
use serde_json::Value;
use std::fmt;

use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticLevel};
use crate::operation::{OpKind, Operation};
use crate::path::Path;

#[derive(Debug, Default)]
pub struct OperationDeserializer {
    pub operation: Option<Operation>,
    pub diagnostics: Vec<Diagnostic>,
}

impl OperationDeserializer {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_diagnostic(&mut self, level: DiagnosticLevel, code: DiagnosticCode, message: String) {
        self.diagnostics.push(Diagnostic::new(level, code, message));
    }

    fn with_fatal(mut self, code: DiagnosticCode, message: String) -> Self {
        self.add_diagnostic(DiagnosticLevel::Fatal, code, message);
        self
    }
}

impl<'de> Deserialize<'de> for OperationDeserializer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(OperationVisitor::new())
    }
}

struct OperationVisitor {
    deserializer: OperationDeserializer,
}

impl OperationVisitor {
    fn new() -> Self {
        Self {
            deserializer: OperationDeserializer::new(),
        }
    }
}

impl<'de> Visitor<'de> for OperationVisitor {
    type Value = OperationDeserializer;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an array representing an operation")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut elements: Vec<Value> = Vec::new();

        while let Some(elem) = seq.next_element::<Value>()? {
            elements.push(elem);
        }

        let deserializer = self.deserializer;

        if elements.is_empty() {
            return Ok(deserializer.with_fatal(
                DiagnosticCode::WrongFieldCount,
                "I found an empty array, but operations must start with a string operation type."
                    .to_string(),
            ));
        }

        let op = match elements[0].as_str() {
            Some(name) => match OpKind::from_name(name) {
                Some(op) => op,
                None => {
                    let mut deserializer = deserializer;
                    deserializer.diagnostics.push(
                        Diagnostic::fatal(
                            DiagnosticCode::UnknownOperationType,
                            format!("I don't know the operation type '{}'.", name),
                        )
                        .with_advice(format!(
                            "Operation types are: {}",
                            OpKind::ALL_NAMES.join(", ")
                        )),
                    );
                    return Ok(deserializer);
                }
            },
            None => {
                return Ok(deserializer.with_fatal(
                    DiagnosticCode::WrongFieldType,
                    "I expected the first element of an operation to be a string operation type."
                        .to_string(),
                ));
            }
        };

        let (min, max) = match op {
            OpKind::Added => (3, 3),
            OpKind::Removed => (2, 3),
            OpKind::Modified => (3, 4),
        };
        if elements.len() < min || elements.len() > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{} or {}", min, max)
            };
            return Ok(deserializer.with_fatal(
                DiagnosticCode::WrongFieldCount,
                format!(
                    "I expected a {} operation to have {} fields, but found {}.",
                    op,
                    expected,
                    elements.len()
                ),
            ));
        }

        let path = match elements[1].as_str() {
            Some(raw) => match Path::parse(raw) {
                Ok(path) => path,
                Err(diag) => {
                    let mut deserializer = deserializer;
                    deserializer.diagnostics.push(diag);
                    return Ok(deserializer);
                }
            },
            None => {
                return Ok(deserializer.with_fatal(
                    DiagnosticCode::WrongFieldType,
                    "I expected the path to be a string.".to_string(),
                ));
            }
        };

        let mut values = elements.into_iter().skip(2);
        let operation = match op {
            OpKind::Added => Operation {
                op,
                path,
                new_value: values.next(),
                old_value: None,
            },
            OpKind::Removed => Operation {
                op,
                path,
                new_value: None,
                old_value: values.next(),
            },
            OpKind::Modified => Operation {
                op,
                path,
                new_value: values.next(),
                old_value: values.next(),
            },
        };

        let mut deserializer = deserializer;
        deserializer.operation = Some(operation);
        Ok(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> OperationDeserializer {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_modified() {
        let result = decode(json!(["modified", "$.name", "Alex", "David"]));
        assert!(result.diagnostics.is_empty());
        assert_eq!(
            result.operation,
            Some(Operation::modified(
                Path::parse("$.name").unwrap(),
                json!("David"),
                json!("Alex")
            ))
        );
    }

    #[test]
    fn test_decode_removed_without_old_value() {
        let result = decode(json!(["removed", "$.list[3]"]));
        assert!(result.diagnostics.is_empty());
        let operation = result.operation.unwrap();
        assert_eq!(operation.op, OpKind::Removed);
        assert_eq!(operation.old_value, None);
    }

    #[test]
    fn test_unknown_operation_type() {
        let result = decode(json!(["replace", "$.a", 1]));
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, DiagnosticCode::UnknownOperationType);
        assert!(result.diagnostics[0].advice.is_some());
        assert!(result.operation.is_none());
    }

    #[test]
    fn test_wrong_field_count() {
        let result = decode(json!(["added", "$.a"]));
        assert_eq!(result.diagnostics[0].code, DiagnosticCode::WrongFieldCount);
        assert!(result.diagnostics[0].description.contains("3 fields, but found 2"));

        let result = decode(json!(["modified", "$.a", 1, 2, 3]));
        assert_eq!(result.diagnostics[0].code, DiagnosticCode::WrongFieldCount);
        assert!(result.diagnostics[0].description.contains("3 or 4 fields"));

        let result = decode(json!([]));
        assert_eq!(result.diagnostics[0].code, DiagnosticCode::WrongFieldCount);
    }

    #[test]
    fn test_wrong_field_types() {
        let result = decode(json!([1, "$.a", 1]));
        assert_eq!(result.diagnostics[0].code, DiagnosticCode::WrongFieldType);

        let result = decode(json!(["added", 7, 1]));
        assert_eq!(result.diagnostics[0].code, DiagnosticCode::WrongFieldType);
    }

    #[test]
    fn test_bad_path() {
        let result = decode(json!(["added", "/json/pointer", 1]));
        assert_eq!(result.diagnostics[0].code, DiagnosticCode::InvalidPathSyntax);
        assert!(result.operation.is_none());
    }

    #[test]
    fn test_not_an_array() {
        assert!(serde_json::from_value::<OperationDeserializer>(json!({"op": "added"})).is_err());
    }
}
