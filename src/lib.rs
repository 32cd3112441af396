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

//! Structural deltas between JSON values.
//!
//! [`diff`] compares two values and returns the operations that turn the
//! first into the second. [`patch`] applies such operations to a value. For
//! any `old` and `new`, `patch(old, diff(old, new)) == new`.

pub mod diagnostics;
pub mod diff;
pub mod document;
pub mod operation;
pub mod operation_deserialize;
pub mod patch;
pub mod path;
pub mod value;
pub mod walk;

pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticCollector, DiagnosticLevel};
pub use diff::{diff, diff_at, diff_with_options, DiffOptions, Differ, DEFAULT_MAX_DEPTH};
pub use document::{DeltaDocument, DOCUMENT_TYPE, DOCUMENT_VERSION};
pub use operation::{Delta, OpKind, Operation};
pub use operation_deserialize::OperationDeserializer;
pub use patch::{apply_operation, patch, patch_with_options, PatchOptions, Patcher, MAX_PADDING};
pub use path::{Path, Segment};
pub use value::{Map, Value, ValueExt, ValueKind};
pub use walk::{assemble, walk, WalkOptions};
