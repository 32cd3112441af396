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

//! Flattening a value into `(path, leaf)` pairs and building it back up.

use crate::diagnostics::Diagnostic;
use crate::operation::Operation;
use crate::patch::{apply_operation, PatchOptions};
use crate::path::Path;
use crate::value::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Also yield non-empty objects and arrays, each before its children.
    pub include_containers: bool,
    /// Containers this many levels below the root are yielded whole instead
    /// of being entered.
    pub max_depth: Option<usize>,
    /// Visit object members in key order instead of document order.
    pub sort_keys: bool,
    /// Leave out `null` leaves. The result no longer rebuilds the value.
    pub exclude_null: bool,
}

/// Lists the values inside `value` in document order, parents before
/// children. Scalars and empty containers are always yielded, so the result
/// is enough for [`assemble`] to rebuild the value.
pub fn walk<'a>(value: &'a Value, options: &WalkOptions) -> Vec<(Path, &'a Value)> {
    let mut entries = Vec::new();
    let mut stack: Vec<(Path, &'a Value)> = vec![(Path::root(), value)];

    while let Some((path, current)) = stack.pop() {
        let cut_off = options.max_depth.is_some_and(|max| path.depth() >= max);

        match current {
            Value::Object(obj) if !obj.is_empty() && !cut_off => {
                if options.include_containers {
                    entries.push((path.clone(), current));
                }
                let mut members: Vec<(&String, &'a Value)> = obj.iter().collect();
                if options.sort_keys {
                    members.sort_by(|a, b| a.0.cmp(b.0));
                }
                for (key, child) in members.into_iter().rev() {
                    stack.push((path.child_key(key.clone()), child));
                }
            }
            Value::Array(arr) if !arr.is_empty() && !cut_off => {
                if options.include_containers {
                    entries.push((path.clone(), current));
                }
                for (index, child) in arr.iter().enumerate().rev() {
                    stack.push((path.child_index(index), child));
                }
            }
            Value::Null if options.exclude_null => {}
            _ => entries.push((path, current)),
        }
    }

    entries
}

/// Rebuilds a value from `(path, value)` pairs, creating objects and arrays
/// along the way. Later entries overwrite earlier ones at the same path.
pub fn assemble<I>(entries: I) -> Result<Value, Diagnostic>
where
    I: IntoIterator<Item = (Path, Value)>,
{
    let options = PatchOptions {
        create_missing: true,
        verify_old_values: false,
    };
    let mut state = Value::Null;

    for (path, value) in entries {
        apply_operation(&mut state, &Operation::added(path, value), &options)?;
    }

    Ok(state)
}
