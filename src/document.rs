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

//! The envelope a delta travels in on disk.
//!
//! ```json
//! {"type": "@peoplesgrocers/json-delta", "version": 1, "id": "...",
//!  "created": "2025-01-01T00:00:00Z", "operations": [...]}
//! ```
//!
//! `type` is written first so a reader can tell a delta file apart from any
//! other JSON file by looking at its first bytes. Readers also accept a bare
//! array of operations, which is what other tools tend to produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticCollector};
use crate::operation::Operation;
use crate::operation_deserialize::OperationDeserializer;

pub const DOCUMENT_TYPE: &str = "@peoplesgrocers/json-delta";
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaDocument {
    #[serde(rename = "type")]
    pub document_type: String,
    pub version: u32,
    pub id: Uuid,
    pub created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub operations: Vec<Operation>,
}

impl DeltaDocument {
    pub fn new(operations: Vec<Operation>, source: Option<String>) -> Self {
        Self {
            document_type: DOCUMENT_TYPE.to_string(),
            version: DOCUMENT_VERSION,
            id: Uuid::new_v4(),
            created: Utc::now(),
            source,
            operations,
        }
    }

    /// Parses JSON text into a document, reporting syntax errors with the
    /// line and column serde_json stopped at.
    pub fn parse(text: &str) -> Result<Self, Vec<Diagnostic>> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| vec![Diagnostic::from_json_error(&e, text)])?;
        Self::from_value(value)
    }

    /// Accepts either the envelope or a bare operations array. A bare array
    /// is wrapped in a fresh envelope. Every malformed operation is reported,
    /// not just the first.
    pub fn from_value(value: Value) -> Result<Self, Vec<Diagnostic>> {
        match value {
            Value::Array(operations) => {
                let operations = decode_operations(operations)?;
                Ok(Self::new(operations, None))
            }
            Value::Object(fields) => Self::from_envelope(fields),
            other => Err(vec![Diagnostic::fatal(
                DiagnosticCode::UnknownDocumentType,
                format!(
                    "I expected a delta document or an array of operations, but found {}.",
                    kind_phrase(&other)
                ),
            )
            .with_advice(envelope_advice())]),
        }
    }

    fn from_envelope(mut fields: Map<String, Value>) -> Result<Self, Vec<Diagnostic>> {
        match fields.get("type").and_then(Value::as_str) {
            Some(DOCUMENT_TYPE) => {}
            Some(other) => {
                return Err(vec![Diagnostic::fatal(
                    DiagnosticCode::UnknownDocumentType,
                    format!(
                        "I found a document of type '{}', but I only read '{}'.",
                        other, DOCUMENT_TYPE
                    ),
                )]);
            }
            None => {
                return Err(vec![missing_field("type")]);
            }
        }

        let version = match fields.get("version").and_then(Value::as_u64) {
            Some(version) => version,
            None => return Err(vec![missing_field("version")]),
        };
        if version != DOCUMENT_VERSION as u64 {
            return Err(vec![Diagnostic::fatal(
                DiagnosticCode::UnsupportedVersion,
                format!(
                    "I found version {}, but I only support version {}.",
                    version, DOCUMENT_VERSION
                ),
            )
            .with_advice(
                "This delta was written by a newer or older version of the format. \
                 You may need to upgrade your tools."
                    .to_string(),
            )]);
        }

        let mut diagnostics = DiagnosticCollector::new();

        let id = match fields.get("id").and_then(Value::as_str).map(Uuid::parse_str) {
            Some(Ok(id)) => Some(id),
            Some(Err(e)) => {
                diagnostics.add(Diagnostic::fatal(
                    DiagnosticCode::MissingDocumentField,
                    format!("I couldn't read the document id as a UUID: {}", e),
                ));
                None
            }
            None => {
                diagnostics.add(missing_field("id"));
                None
            }
        };

        let created = match fields
            .get("created")
            .and_then(Value::as_str)
            .map(DateTime::parse_from_rfc3339)
        {
            Some(Ok(created)) => Some(created.with_timezone(&Utc)),
            Some(Err(e)) => {
                diagnostics.add(Diagnostic::fatal(
                    DiagnosticCode::MissingDocumentField,
                    format!("I couldn't read the created timestamp: {}", e),
                )
                .with_advice("Timestamps use RFC 3339, like 2025-01-01T00:00:00Z.".to_string()));
                None
            }
            None => {
                diagnostics.add(missing_field("created"));
                None
            }
        };

        let source = match fields.remove("source") {
            None | Some(Value::Null) => None,
            Some(Value::String(source)) => Some(source),
            Some(_) => {
                diagnostics.add(Diagnostic::fatal(
                    DiagnosticCode::MissingDocumentField,
                    "I expected the source field to be a string.".to_string(),
                ));
                None
            }
        };

        let operations = match fields.remove("operations") {
            Some(Value::Array(operations)) => match decode_operations(operations) {
                Ok(operations) => Some(operations),
                Err(errors) => {
                    diagnostics.extend(errors);
                    None
                }
            },
            _ => {
                diagnostics.add(missing_field("operations"));
                None
            }
        };

        match (id, created, operations) {
            (Some(id), Some(created), Some(operations)) if diagnostics.is_empty() => Ok(Self {
                document_type: DOCUMENT_TYPE.to_string(),
                version: DOCUMENT_VERSION,
                id,
                created,
                source,
                operations,
            }),
            _ => Err(diagnostics.into_diagnostics()),
        }
    }
}

fn decode_operations(values: Vec<Value>) -> Result<Vec<Operation>, Vec<Diagnostic>> {
    let mut operations = Vec::with_capacity(values.len());
    let mut diagnostics = DiagnosticCollector::new();

    for (index, value) in values.into_iter().enumerate() {
        match OperationDeserializer::deserialize(value) {
            Ok(decoded) => {
                diagnostics.extend(
                    decoded
                        .diagnostics
                        .into_iter()
                        .map(|diag| diag.with_operation(index)),
                );
                if let Some(operation) = decoded.operation {
                    operations.push(operation);
                }
            }
            Err(e) => {
                diagnostics.add(
                    Diagnostic::fatal(
                        DiagnosticCode::InvalidOperationJson,
                        format!("I expected an operation array: {}", e),
                    )
                    .with_operation(index)
                    .with_advice(
                        "Operations look like [\"added\", \"$.a\", 1], [\"removed\", \"$.a\"] \
                         or [\"modified\", \"$.a\", 2, 1]."
                            .to_string(),
                    ),
                );
            }
        }
    }

    if diagnostics.is_empty() {
        Ok(operations)
    } else {
        Err(diagnostics.into_diagnostics())
    }
}

fn missing_field(field: &str) -> Diagnostic {
    Diagnostic::fatal(
        DiagnosticCode::MissingDocumentField,
        format!("I couldn't find a valid '{}' field in the delta document.", field),
    )
    .with_advice(envelope_advice())
}

fn envelope_advice() -> String {
    format!(
        "A delta document contains:\n\
         - type: \"{}\"\n\
         - version: {}\n\
         - id: a UUID\n\
         - created: an RFC 3339 timestamp\n\
         - operations: an array of operations",
        DOCUMENT_TYPE, DOCUMENT_VERSION
    )
}

fn kind_phrase(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
