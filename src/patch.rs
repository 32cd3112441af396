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

//! Applies a delta to a base value.
//!
//! `patch` works on a clone of the base and either returns the fully patched
//! value or the first error, never something in between. The base is left
//! alone in both cases.

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::operation::{OpKind, Operation};
use crate::path::{index_out_of_bounds, key_not_found, wrong_container, Segment};
use crate::value::Value;

/// With `create_missing`, the most `null` elements a single operation may
/// pad an array with.
pub const MAX_PADDING: usize = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchOptions {
    /// Create missing intermediate containers instead of failing. A missing
    /// slot becomes `[]` when the next segment is an index and `{}`
    /// otherwise, `null` slots are replaced the same way, and short arrays
    /// are padded with `null`.
    pub create_missing: bool,
    /// Refuse to remove or modify a value that differs from the operation's
    /// `old_value`, when it carries one.
    pub verify_old_values: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Patcher {
    options: PatchOptions,
}

impl Patcher {
    pub fn new(options: PatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PatchOptions {
        &self.options
    }

    pub fn patch(&self, base: &Value, operations: &[Operation]) -> Result<Value, Diagnostic> {
        let mut state = base.clone();
        let mut position = 0;

        while position < operations.len() {
            let run = removal_run_len(&operations[position..]);
            if run > 1 {
                self.apply_removal_run(&mut state, &operations[position..position + run], position)?;
                position += run;
            } else {
                let operation = &operations[position];
                apply_operation(&mut state, operation, &self.options)
                    .map_err(|diag| diag.with_operation(position))?;
                position += 1;
            }
        }

        Ok(state)
    }

    /// Consecutive removals of elements from the same array all refer to the
    /// array as it was before the first of them, so they are applied from
    /// the highest index down.
    fn apply_removal_run(
        &self,
        state: &mut Value,
        run: &[Operation],
        first_position: usize,
    ) -> Result<(), Diagnostic> {
        let mut order: Vec<(usize, usize)> = run
            .iter()
            .enumerate()
            .filter_map(|(offset, op)| {
                let index = op.path.last().and_then(Segment::as_index)?;
                Some((index, first_position + offset))
            })
            .collect();
        order.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        for pair in order.windows(2) {
            if pair[0].0 == pair[1].0 {
                let duplicate = &run[pair[1].1 - first_position];
                return Err(Diagnostic::fatal(
                    DiagnosticCode::DuplicateRemoval,
                    format!(
                        "I found two removals of index {} in the same array. \
                         The other one is operation #{}.",
                        pair[0].0, pair[0].1
                    ),
                )
                .with_operation(pair[1].1)
                .with_path(duplicate.path.to_string()));
            }
        }

        for (_, position) in order {
            let operation = &run[position - first_position];
            apply_operation(state, operation, &self.options)
                .map_err(|diag| diag.with_operation(position))?;
        }

        Ok(())
    }
}

pub fn patch(base: &Value, operations: &[Operation]) -> Result<Value, Diagnostic> {
    Patcher::default().patch(base, operations)
}

pub fn patch_with_options(
    base: &Value,
    operations: &[Operation],
    options: &PatchOptions,
) -> Result<Value, Diagnostic> {
    Patcher::new(options.clone()).patch(base, operations)
}

/// Applies one operation to `state` in place.
///
/// There is no rollback here: with `create_missing` a failed operation can
/// leave freshly created containers behind, and earlier operations stay
/// applied. [`patch`] is the atomic entry point.
pub fn apply_operation(
    state: &mut Value,
    operation: &Operation,
    options: &PatchOptions,
) -> Result<(), Diagnostic> {
    let result = match operation.op {
        OpKind::Added | OpKind::Modified => match &operation.new_value {
            Some(new_value) => apply_set(state, operation, new_value.clone(), options),
            None => Err(Diagnostic::fatal(
                DiagnosticCode::MissingNewValue,
                format!(
                    "I can't apply this {} operation because it has no new value.",
                    operation.op
                ),
            )),
        },
        OpKind::Removed => apply_remove(state, operation, options),
    };

    result.map_err(|diag| diag.with_path(operation.path.to_string()))
}

fn apply_set(
    state: &mut Value,
    operation: &Operation,
    new_value: Value,
    options: &PatchOptions,
) -> Result<(), Diagnostic> {
    let (parents, last) = match operation.path.split_last() {
        Some(split) => split,
        None => {
            if operation.op == OpKind::Modified {
                verify_old_value(state, operation, options)?;
            }
            *state = new_value;
            return Ok(());
        }
    };

    let parent = navigate_mut(state, parents, last, options.create_missing)?;

    match (last, parent) {
        (Segment::Key(key), Value::Object(obj)) => {
            match obj.get(key) {
                Some(current) => {
                    if operation.op == OpKind::Modified {
                        verify_old_value(current, operation, options)?;
                    }
                }
                None => {
                    if operation.op == OpKind::Modified && !options.create_missing {
                        return Err(key_not_found(parents, key, DiagnosticCode::PathNotFound)
                            .with_advice(
                                "A modified operation replaces an existing value. \
                                 Use an added operation to introduce a new key."
                                    .to_string(),
                            ));
                    }
                }
            }
            obj.insert(key.clone(), new_value);
            Ok(())
        }
        (Segment::Index(index), Value::Array(arr)) => {
            let index = *index;
            if index < arr.len() {
                if operation.op == OpKind::Modified {
                    verify_old_value(&arr[index], operation, options)?;
                }
                arr[index] = new_value;
                Ok(())
            } else if index == arr.len() && operation.op == OpKind::Added {
                arr.push(new_value);
                Ok(())
            } else if options.create_missing {
                if index - arr.len() > MAX_PADDING {
                    return Err(padding_too_large(parents, index, arr.len()));
                }
                arr.resize(index, Value::Null);
                arr.push(new_value);
                Ok(())
            } else {
                Err(index_out_of_bounds(
                    parents,
                    index,
                    arr.len(),
                    DiagnosticCode::ArrayIndexOutOfBounds,
                ))
            }
        }
        (segment, parent) => Err(wrong_container(parents, segment, parent)),
    }
}

fn apply_remove(
    state: &mut Value,
    operation: &Operation,
    options: &PatchOptions,
) -> Result<(), Diagnostic> {
    let (parents, last) = operation.path.split_last().ok_or_else(|| {
        Diagnostic::fatal(
            DiagnosticCode::RootRemoval,
            "I can't remove the root value.".to_string(),
        )
        .with_advice("To replace the whole value, use a modified operation at $.".to_string())
    })?;

    let parent = navigate_mut(state, parents, last, false)?;

    match (last, parent) {
        (Segment::Key(key), Value::Object(obj)) => {
            let current = obj
                .get(key)
                .ok_or_else(|| key_not_found(parents, key, DiagnosticCode::PathNotFound))?;
            verify_old_value(current, operation, options)?;
            obj.shift_remove(key);
            Ok(())
        }
        (Segment::Index(index), Value::Array(arr)) => {
            let len = arr.len();
            let current = arr.get(*index).ok_or_else(|| {
                index_out_of_bounds(parents, *index, len, DiagnosticCode::ArrayIndexOutOfBounds)
            })?;
            verify_old_value(current, operation, options)?;
            arr.remove(*index);
            Ok(())
        }
        (segment, parent) => Err(wrong_container(parents, segment, parent)),
    }
}

/// Walks `segments` from the root and returns the container the final
/// segment `leaf` should be applied to.
fn navigate_mut<'a>(
    root: &'a mut Value,
    segments: &[Segment],
    leaf: &Segment,
    create_missing: bool,
) -> Result<&'a mut Value, Diagnostic> {
    let mut current = root;

    if create_missing && current.is_null() {
        *current = empty_container_for(segments.first().unwrap_or(leaf));
    }

    for (depth, segment) in segments.iter().enumerate() {
        let at = &segments[..depth];
        let next = segments.get(depth + 1).unwrap_or(leaf);

        current = match (segment, current) {
            (Segment::Key(key), Value::Object(obj)) => {
                if create_missing {
                    let slot = obj.entry(key.clone()).or_insert(Value::Null);
                    if slot.is_null() {
                        *slot = empty_container_for(next);
                    }
                    slot
                } else {
                    obj.get_mut(key).ok_or_else(|| {
                        key_not_found(at, key, DiagnosticCode::ParentPathNotFound)
                    })?
                }
            }
            (Segment::Index(index), Value::Array(arr)) => {
                let index = *index;
                let len = arr.len();
                if create_missing {
                    if index >= len {
                        if index - len > MAX_PADDING {
                            return Err(padding_too_large(at, index, len));
                        }
                        arr.resize(index + 1, Value::Null);
                    }
                    let slot = &mut arr[index];
                    if slot.is_null() {
                        *slot = empty_container_for(next);
                    }
                    slot
                } else {
                    arr.get_mut(index).ok_or_else(|| {
                        index_out_of_bounds(at, index, len, DiagnosticCode::ParentPathNotFound)
                    })?
                }
            }
            (segment, other) => return Err(wrong_container(at, segment, other)),
        };
    }

    Ok(current)
}

fn padding_too_large(at: &[Segment], index: usize, len: usize) -> Diagnostic {
    index_out_of_bounds(at, index, len, DiagnosticCode::ArrayIndexOutOfBounds).with_advice(
        format!(
            "Creating missing elements pads arrays with null, but never by more than {} elements.",
            MAX_PADDING
        ),
    )
}

fn empty_container_for(segment: &Segment) -> Value {
    match segment {
        Segment::Key(_) => Value::Object(Default::default()),
        Segment::Index(_) => Value::Array(Vec::new()),
    }
}

fn verify_old_value(
    current: &Value,
    operation: &Operation,
    options: &PatchOptions,
) -> Result<(), Diagnostic> {
    if !options.verify_old_values {
        return Ok(());
    }

    match &operation.old_value {
        Some(expected) if expected != current => Err(Diagnostic::fatal(
            DiagnosticCode::OldValueMismatch,
            format!(
                "I expected to find {} here, but found {}.",
                preview(expected),
                preview(current)
            ),
        )
        .with_advice(
            "The delta was probably computed against a different base value.".to_string(),
        )),
        _ => Ok(()),
    }
}

fn preview(value: &Value) -> String {
    const LIMIT: usize = 80;
    let rendered = value.to_string();
    if rendered.chars().count() <= LIMIT {
        rendered
    } else {
        let truncated: String = rendered.chars().take(LIMIT).collect();
        format!("{}...", truncated)
    }
}

fn removal_run_len(operations: &[Operation]) -> usize {
    let parent = match operations.first() {
        Some(first) => match array_removal_parent(first) {
            Some(parent) => parent,
            None => return 0,
        },
        None => return 0,
    };

    operations
        .iter()
        .take_while(|op| array_removal_parent(op) == Some(parent))
        .count()
}

fn array_removal_parent(operation: &Operation) -> Option<&[Segment]> {
    if operation.op != OpKind::Removed {
        return None;
    }
    match operation.path.split_last()? {
        (parent, Segment::Index(_)) => Some(parent),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use crate::path::Path;
    use serde_json::json;

    fn path(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    fn assert_round_trip(old: Value, new: Value) {
        let forward = diff(&old, &new);
        assert_eq!(patch(&old, &forward).unwrap(), new, "forward delta {:?}", forward);

        let backward = diff(&new, &old);
        assert_eq!(patch(&new, &backward).unwrap(), old, "backward delta {:?}", backward);
    }

    #[test]
    fn test_round_trips() {
        assert_round_trip(json!({"a": 1}), json!({"a": 2, "b": {"c": "x"}}));
        assert_round_trip(json!({"list": [1, 2, 3]}), json!({"list": [1, 4, 3, 5]}));
        assert_round_trip(
            json!({"details": {"matrix": [[1, 2], [3, 4]], "meta": {"active": true}}}),
            json!({"details": {"matrix": [[1, 2], [3, 5], [8]], "meta": {"active": false}}}),
        );
        assert_round_trip(
            json!({"items": [{"id": 1, "v": "a"}, {"id": 2}]}),
            json!({"items": [{"id": 1, "v": "b"}, {"id": 2, "x": 1}, {"id": 3}]}),
        );
        assert_round_trip(json!({"n": null, "z": 1}), json!({"n": 0, "z": null}));
        assert_round_trip(json!({"v": 1}), json!({"v": [1, 2]}));
        assert_round_trip(json!([1, 2, 3, 4, 5]), json!([9]));
        assert_round_trip(json!({"a": 1}), json!("scalar root"));
        assert_round_trip(json!({"a.b": {"": [1]}}), json!({"a.b": {"": []}}));
    }

    #[test]
    fn test_complex_round_trip_from_small_base() {
        let old = json!({"name": "amin"});
        let new = json!({
            "full_name": "a",
            "details": {
                "matrix": [[[1, 2, 3]], [1, 2, 3]],
                "list_object": [{"name": "amin", "matrix": [[1, 2], [1, 4]]}],
            },
        });
        assert_round_trip(old, new);
    }

    #[test]
    fn test_type_mismatch_patch() {
        let old = json!({"v": 1});
        let delta = vec![Operation::modified(path("$.v"), json!(1), json!([1, 2]))];
        assert_eq!(patch(&old, &delta).unwrap(), json!({"v": [1, 2]}));
    }

    #[test]
    fn test_missing_parent_is_navigation_error() {
        let base = json!({});
        let delta = vec![Operation {
            op: OpKind::Modified,
            path: path("$.a.b"),
            new_value: Some(json!(5)),
            old_value: None,
        }];
        let err = patch(&base, &delta).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::ParentPathNotFound);
        assert!(err.is_navigation_error());
        assert_eq!(err.operation_index, Some(0));
        assert_eq!(err.path.as_deref(), Some("$.a.b"));
    }

    #[test]
    fn test_failure_leaves_base_untouched() {
        let base = json!({"a": 1, "list": [1, 2]});
        let delta = vec![
            Operation::modified(path("$.a"), json!(1), json!(2)),
            Operation::removed(path("$.list[7]"), json!(0)),
        ];
        let err = patch(&base, &delta).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::ArrayIndexOutOfBounds);
        assert_eq!(err.operation_index, Some(1));
        assert_eq!(base, json!({"a": 1, "list": [1, 2]}));
    }

    #[test]
    fn test_empty_delta() {
        let base = json!({"x": [1, {"y": null}]});
        assert_eq!(patch(&base, &[]).unwrap(), base);
    }

    #[test]
    fn test_wrong_container_kind() {
        let base = json!({"a": [1, 2]});
        let err = patch(&base, &[Operation::added(path("$.a.b"), json!(1))]).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::TypeMismatch);

        let err = patch(&base, &[Operation::added(path("$[0]"), json!(1))]).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::TypeMismatch);
    }

    #[test]
    fn test_modified_requires_existing_key() {
        let base = json!({"a": 1});
        let err = patch(&base, &[Operation::modified(path("$.b"), json!(1), json!(2))]).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::PathNotFound);
    }

    #[test]
    fn test_added_array_index() {
        let base = json!([1, 2]);
        assert_eq!(
            patch(&base, &[Operation::added(path("$[2]"), json!(3))]).unwrap(),
            json!([1, 2, 3])
        );
        assert_eq!(
            patch(&base, &[Operation::added(path("$[0]"), json!(0))]).unwrap(),
            json!([0, 2])
        );
        let err = patch(&base, &[Operation::added(path("$[5]"), json!(3))]).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::ArrayIndexOutOfBounds);
    }

    #[test]
    fn test_modified_cannot_append() {
        let base = json!([1, 2]);
        let err = patch(&base, &[Operation::modified(path("$[2]"), json!(0), json!(3))]).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::ArrayIndexOutOfBounds);
    }

    #[test]
    fn test_root_operations() {
        let base = json!({"a": 1});
        assert_eq!(
            patch(&base, &[Operation::modified(Path::root(), base.clone(), json!([1]))]).unwrap(),
            json!([1])
        );

        let err = patch(&base, &[Operation::removed(Path::root(), base.clone())]).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::RootRemoval);
    }

    #[test]
    fn test_missing_new_value() {
        let base = json!({"a": 1});
        let op = Operation {
            op: OpKind::Added,
            path: path("$.b"),
            new_value: None,
            old_value: None,
        };
        let err = patch(&base, &[op]).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::MissingNewValue);
    }

    #[test]
    fn test_removal_run_in_any_order() {
        let base = json!({"list": ["a", "b", "c", "d", "e"]});
        let expected = json!({"list": ["a", "b"]});

        let descending = vec![
            Operation::removed(path("$.list[4]"), json!("e")),
            Operation::removed(path("$.list[3]"), json!("d")),
            Operation::removed(path("$.list[2]"), json!("c")),
        ];
        assert_eq!(patch(&base, &descending).unwrap(), expected);

        let mut ascending = descending.clone();
        ascending.reverse();
        assert_eq!(patch(&base, &ascending).unwrap(), expected);

        let verified = PatchOptions {
            verify_old_values: true,
            ..Default::default()
        };
        assert_eq!(patch_with_options(&base, &ascending, &verified).unwrap(), expected);
    }

    #[test]
    fn test_removal_run_from_the_middle() {
        let base = json!([0, 1, 2, 3, 4]);
        let delta = vec![
            Operation::removed(path("$[1]"), json!(1)),
            Operation::removed(path("$[3]"), json!(3)),
        ];
        assert_eq!(patch(&base, &delta).unwrap(), json!([0, 2, 4]));
    }

    #[test]
    fn test_duplicate_removal_rejected() {
        let base = json!([0, 1, 2]);
        let delta = vec![
            Operation::removed(path("$[1]"), json!(1)),
            Operation::removed(path("$[1]"), json!(1)),
        ];
        let err = patch(&base, &delta).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::DuplicateRemoval);
        assert_eq!(err.operation_index, Some(1));
    }

    #[test]
    fn test_disjoint_operations_commute() {
        let base = json!({"a": {"x": 1}, "b": [1, 2], "c": "keep"});
        let delta = vec![
            Operation::modified(path("$.a.x"), json!(1), json!(2)),
            Operation::added(path("$.b[2]"), json!(3)),
            Operation::added(path("$.d"), json!(true)),
            Operation::removed(path("$.c"), json!("keep")),
        ];
        let forward = patch(&base, &delta).unwrap();

        let mut reversed = delta.clone();
        reversed.reverse();
        assert_eq!(patch(&base, &reversed).unwrap(), forward);
        assert_eq!(forward, json!({"a": {"x": 2}, "b": [1, 2, 3], "d": true}));
    }

    #[test]
    fn test_create_missing() {
        let options = PatchOptions {
            create_missing: true,
            ..Default::default()
        };
        let base = json!({"a": null});
        let delta = vec![
            Operation::added(path("$.a.b[2].c"), json!(1)),
            Operation::added(path("$.x[1]"), json!("y")),
        ];
        assert_eq!(
            patch_with_options(&base, &delta, &options).unwrap(),
            json!({"a": {"b": [null, null, {"c": 1}]}, "x": [null, "y"]})
        );

        let base = json!({});
        let delta = vec![Operation::modified(path("$.a.b"), json!(null), json!(5))];
        assert_eq!(
            patch_with_options(&base, &delta, &options).unwrap(),
            json!({"a": {"b": 5}})
        );
    }

    #[test]
    fn test_create_missing_does_not_overwrite_scalars() {
        let options = PatchOptions {
            create_missing: true,
            ..Default::default()
        };
        let base = json!({"a": 3});
        let err = patch_with_options(&base, &[Operation::added(path("$.a.b"), json!(1))], &options)
            .unwrap_err();
        assert_eq!(err.code, DiagnosticCode::TypeMismatch);
    }

    #[test]
    fn test_create_missing_refuses_huge_padding() {
        let options = PatchOptions {
            create_missing: true,
            ..Default::default()
        };
        let base = json!({"a": []});
        let huge = |tail: Vec<Segment>| {
            let mut segments = vec![Segment::Key("a".to_string()), Segment::Index(usize::MAX)];
            segments.extend(tail);
            Path::from_segments(segments)
        };

        let nested = Operation::added(huge(vec![Segment::Key("b".to_string())]), json!(1));
        let err = patch_with_options(&base, &[nested], &options).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::ArrayIndexOutOfBounds);
        assert!(err.advice.is_some());

        let leaf = Operation::added(huge(Vec::new()), json!(1));
        let err = patch_with_options(&base, &[leaf], &options).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::ArrayIndexOutOfBounds);

        let edge = Operation::added(path(&format!("$.a[{}]", MAX_PADDING)), json!(1));
        let padded = patch_with_options(&base, &[edge], &options).unwrap();
        assert_eq!(padded["a"].as_array().map(Vec::len), Some(MAX_PADDING + 1));
    }

    #[test]
    fn test_verify_old_values() {
        let options = PatchOptions {
            verify_old_values: true,
            ..Default::default()
        };
        let base = json!({"name": "David", "gone": 1});

        let stale = vec![Operation::modified(path("$.name"), json!("Dave"), json!("Alex"))];
        let err = patch_with_options(&base, &stale, &options).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::OldValueMismatch);
        assert!(!err.is_navigation_error());

        let stale_removal = vec![Operation::removed(path("$.gone"), json!(2))];
        let err = patch_with_options(&base, &stale_removal, &options).unwrap_err();
        assert_eq!(err.code, DiagnosticCode::OldValueMismatch);

        // Without the option the old value is informational only.
        assert_eq!(
            patch(&base, &stale).unwrap(),
            json!({"name": "Alex", "gone": 1})
        );

        let unknown_old = vec![Operation::removed(path("$.gone"), json!(2)).without_old_value()];
        assert_eq!(
            patch_with_options(&base, &unknown_old, &options).unwrap(),
            json!({"name": "David"})
        );
    }

    #[test]
    fn test_removed_key_keeps_sibling_order() {
        let base = json!({"a": 1, "b": 2, "c": 3});
        let result = patch(&base, &[Operation::removed(path("$.a"), json!(1))]).unwrap();
        let keys: Vec<&String> = result.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["b", "c"]);
    }

    #[test]
    fn test_apply_operation_in_place() {
        let mut state = json!({"count": 1});
        apply_operation(
            &mut state,
            &Operation::modified(path("$.count"), json!(1), json!(2)),
            &PatchOptions::default(),
        )
        .unwrap();
        assert_eq!(state, json!({"count": 2}));
    }
}
