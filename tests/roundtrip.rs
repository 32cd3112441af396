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

//! Random value pairs derived from fixed byte seeds, checked against the
//! laws every delta has to satisfy.

use arbitrary::{Arbitrary, Unstructured};
use json_delta::{
    diff, diff_with_options, patch, DeltaDocument, DiffOptions, OpKind, Operation, Value,
};
use serde_json::{json, Map};

#[derive(Arbitrary, Debug)]
enum TestValue {
    Null,
    Bool(bool),
    Integer(i32),
    Float(f64),
    Text(String),
    Array(Vec<TestValue>),
    Object(Vec<(String, TestValue)>),
}

impl TestValue {
    fn to_json(&self) -> Value {
        match self {
            TestValue::Null => Value::Null,
            TestValue::Bool(b) => Value::Bool(*b),
            TestValue::Integer(n) => json!(n),
            TestValue::Float(n) => json!(n),
            TestValue::Text(s) => Value::String(s.clone()),
            TestValue::Array(items) => Value::Array(items.iter().map(TestValue::to_json).collect()),
            TestValue::Object(entries) => {
                let map: Map<String, Value> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                Value::Object(map)
            }
        }
    }
}

/// Deterministic filler bytes so failures reproduce.
fn seed_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as u8
        })
        .collect()
}

fn value_pairs() -> Vec<(Value, Value)> {
    (0..200u64)
        .filter_map(|seed| {
            let bytes = seed_bytes(seed, 512);
            let mut u = Unstructured::new(&bytes);
            let old = TestValue::arbitrary(&mut u).ok()?;
            let new = TestValue::arbitrary(&mut u).ok()?;
            Some((old.to_json(), new.to_json()))
        })
        .collect()
}

/// Small edits of a shared base, so the pairs have overlapping structure
/// and the recursive branches actually run.
fn related_pairs() -> Vec<(Value, Value)> {
    let base = json!({
        "user": {"id": 1, "name": "Amin", "tags": ["a", "b", "c"]},
        "items": [{"sku": "x", "qty": 1}, {"sku": "y", "qty": 2}],
        "flags": {"beta": true, "a.b": null},
        "": []
    });

    vec![
        json!({
            "user": {"id": 1, "name": "Amin", "tags": ["a", "c"]},
            "items": [{"sku": "x", "qty": 3}],
            "flags": {"beta": false, "a.b": null},
            "": []
        }),
        json!({
            "items": [{"sku": "x", "qty": 1}, {"sku": "y", "qty": 2}, {"sku": "z"}],
            "user": {"id": "1", "name": "Amin", "tags": ["a", "b", "c", "d"]},
            "flags": [],
            "new": {"nested": [[1], [2, 3]]}
        }),
        json!({"user": null}),
        json!([base.clone()]),
        base.clone(),
    ]
    .into_iter()
    .map(|new| (base.clone(), new))
    .collect()
}

fn all_pairs() -> Vec<(Value, Value)> {
    let mut pairs = value_pairs();
    pairs.extend(related_pairs());
    pairs
}

#[test]
fn test_patch_of_diff_reproduces_new() {
    for (old, new) in all_pairs() {
        let delta = diff(&old, &new);
        let patched = patch(&old, &delta).unwrap_or_else(|e| {
            panic!("delta failed to apply\nold: {}\nnew: {}\n{}", old, new, e)
        });
        assert_eq!(patched, new, "old: {}\ndelta: {:?}", old, delta);
    }
}

#[test]
fn test_reverse_direction() {
    for (old, new) in all_pairs() {
        let delta = diff(&new, &old);
        assert_eq!(patch(&new, &delta).unwrap(), old);
    }
}

#[test]
fn test_equal_values_give_empty_delta() {
    for (value, _) in all_pairs() {
        assert!(diff(&value, &value).is_empty());
        assert_eq!(patch(&value, &[]).unwrap(), value);
    }
}

#[test]
fn test_depth_limits_keep_the_law() {
    for (old, new) in related_pairs() {
        for max_depth in [Some(0), Some(1), Some(2), None] {
            let delta = diff_with_options(&old, &new, &DiffOptions { max_depth });
            assert_eq!(patch(&old, &delta).unwrap(), new, "max_depth {:?}", max_depth);
        }
    }
}

#[test]
fn test_deltas_survive_the_document_format() {
    for (old, new) in all_pairs() {
        let delta = diff(&old, &new);
        let document = DeltaDocument::new(delta.clone(), Some("roundtrip".to_string()));
        let text = serde_json::to_string_pretty(&document).unwrap();
        let back = DeltaDocument::parse(&text).unwrap();
        assert_eq!(back.operations, delta);
        assert_eq!(patch(&old, &back.operations).unwrap(), new);
    }
}

#[test]
fn test_floats_keep_every_bit_through_text() {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut floats = vec![1.0715660391465826e-75, 0.1, -2.5e-308, 1.7976931348623157e308];
    while floats.len() < 5000 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let f = f64::from_bits(state);
        if f.is_finite() {
            floats.push(f);
        }
    }

    for f in floats {
        let old = json!({"x": 0});
        let new = json!({"x": f});
        let document = DeltaDocument::new(diff(&old, &new), None);
        let back = DeltaDocument::parse(&serde_json::to_string(&document).unwrap()).unwrap();
        assert_eq!(back.operations, document.operations, "float {:e}", f);
        assert_eq!(patch(&old, &back.operations).unwrap(), new);
    }
}

#[test]
fn test_old_values_are_optional() {
    for (old, new) in all_pairs() {
        let stripped: Vec<Operation> = diff(&old, &new)
            .into_iter()
            .map(Operation::without_old_value)
            .collect();
        assert!(stripped.iter().all(|op| op.old_value.is_none()));
        assert_eq!(patch(&old, &stripped).unwrap(), new);
    }
}

#[test]
fn test_diff_output_shape() {
    for (old, new) in all_pairs() {
        for operation in diff(&old, &new) {
            match operation.op {
                OpKind::Added => {
                    assert!(operation.new_value.is_some() && operation.old_value.is_none())
                }
                OpKind::Removed => {
                    assert!(operation.new_value.is_none() && operation.old_value.is_some())
                }
                OpKind::Modified => {
                    assert!(operation.new_value.is_some() && operation.old_value.is_some());
                    assert_ne!(operation.new_value, operation.old_value);
                }
            }
        }
    }
}
