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

//! Structural diff between two values.
//!
//! Output order is fixed so that the same inputs always give the same delta:
//!
//! - objects: keys removed from `old` first (in `old`'s order), then `new`'s
//!   keys in `new`'s order, each either added or diffed recursively.
//! - arrays: compared by position. Shared indices first, then appended
//!   indices ascending, then dropped indices descending. Applying the delta
//!   front to back therefore never shifts an index a later operation needs.
//!
//! Arrays get no move or LCS detection. Inserting at the front of a list
//! rewrites every element after it.

use serde_json::Map;

use crate::operation::Operation;
use crate::path::{Path, Segment};
use crate::value::Value;

/// Containers nested deeper than this are compared as a whole.
pub const DEFAULT_MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    /// Once this many levels below the starting path, differing containers
    /// are reported as a single `modified` instead of being descended into.
    /// `None` removes the limit.
    pub max_depth: Option<usize>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Differ {
    options: DiffOptions,
}

impl Differ {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    pub fn diff(&self, old: &Value, new: &Value) -> Vec<Operation> {
        self.diff_at(old, new, Path::root())
    }

    /// Like [`Differ::diff`] but every emitted path starts at `base`, for
    /// when `old` and `new` are sub-documents of a larger value.
    pub fn diff_at(&self, old: &Value, new: &Value, base: Path) -> Vec<Operation> {
        let mut run = DiffRun {
            options: &self.options,
            path: base,
            depth: 0,
            result: Vec::new(),
        };
        run.diff_recursive(old, new);
        run.result
    }
}

pub fn diff(old: &Value, new: &Value) -> Vec<Operation> {
    Differ::default().diff(old, new)
}

pub fn diff_with_options(old: &Value, new: &Value, options: &DiffOptions) -> Vec<Operation> {
    Differ::new(options.clone()).diff(old, new)
}

pub fn diff_at(old: &Value, new: &Value, base: Path, options: &DiffOptions) -> Vec<Operation> {
    Differ::new(options.clone()).diff_at(old, new, base)
}

struct DiffRun<'a> {
    options: &'a DiffOptions,
    path: Path,
    depth: usize,
    result: Vec<Operation>,
}

impl DiffRun<'_> {
    fn diff_recursive(&mut self, old: &Value, new: &Value) {
        match (old, new) {
            (Value::Object(old_obj), Value::Object(new_obj)) if !self.at_depth_limit() => {
                self.diff_objects(old_obj, new_obj);
            }
            (Value::Array(old_arr), Value::Array(new_arr)) if !self.at_depth_limit() => {
                self.diff_arrays(old_arr, new_arr);
            }
            _ => {
                // Differing scalars, a change of kind, or the depth limit.
                if old != new {
                    self.result.push(Operation::modified(
                        self.path.clone(),
                        old.clone(),
                        new.clone(),
                    ));
                }
            }
        }
    }

    fn diff_objects(&mut self, old: &Map<String, Value>, new: &Map<String, Value>) {
        for (key, old_value) in old {
            if !new.contains_key(key) {
                let path = self.child_path(Segment::Key(key.clone()));
                self.result.push(Operation::removed(path, old_value.clone()));
            }
        }

        for (key, new_value) in new {
            match old.get(key) {
                None => {
                    let path = self.child_path(Segment::Key(key.clone()));
                    self.result.push(Operation::added(path, new_value.clone()));
                }
                Some(old_value) => self.descend(Segment::Key(key.clone()), old_value, new_value),
            }
        }
    }

    fn diff_arrays(&mut self, old: &[Value], new: &[Value]) {
        let common = old.len().min(new.len());

        for (index, (old_value, new_value)) in old.iter().zip(new).enumerate() {
            self.descend(Segment::Index(index), old_value, new_value);
        }

        for (index, new_value) in new.iter().enumerate().skip(common) {
            let path = self.child_path(Segment::Index(index));
            self.result.push(Operation::added(path, new_value.clone()));
        }

        // Highest index first so each removal takes the current last element.
        for index in (common..old.len()).rev() {
            let path = self.child_path(Segment::Index(index));
            self.result.push(Operation::removed(path, old[index].clone()));
        }
    }

    fn descend(&mut self, segment: Segment, old: &Value, new: &Value) {
        self.path.push(segment);
        self.depth += 1;
        self.diff_recursive(old, new);
        self.depth -= 1;
        self.path.pop();
    }

    fn child_path(&self, segment: Segment) -> Path {
        let mut path = self.path.clone();
        path.push(segment);
        path
    }

    fn at_depth_limit(&self) -> bool {
        self.options.max_depth.is_some_and(|max| self.depth >= max)
    }
}
