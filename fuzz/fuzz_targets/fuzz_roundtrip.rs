#![no_main]

use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;
use json_delta::{diff, diff_with_options, patch, DiffOptions, Operation, Path};
use serde_json::{json, Value};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    old: FuzzValue,
    new: FuzzValue,
    max_depth: Option<u8>,
    stray: Vec<FuzzOperation>,
}

#[derive(Arbitrary, Debug)]
enum FuzzValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<FuzzValue>),
    Object(Vec<(String, FuzzValue)>),
}

#[derive(Arbitrary, Debug)]
enum FuzzOperation {
    Added(String, FuzzValue),
    Removed(String),
    Modified(String, FuzzValue),
}

impl FuzzValue {
    fn to_json(&self) -> Value {
        match self {
            FuzzValue::Null => Value::Null,
            FuzzValue::Bool(b) => Value::Bool(*b),
            FuzzValue::Integer(n) => json!(n),
            FuzzValue::Float(n) => json!(n),
            FuzzValue::String(s) => Value::String(s.clone()),
            FuzzValue::Array(arr) => Value::Array(arr.iter().map(|v| v.to_json()).collect()),
            FuzzValue::Object(obj) => {
                let map: serde_json::Map<String, Value> = obj
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                Value::Object(map)
            }
        }
    }
}

impl FuzzOperation {
    fn to_operation(&self) -> Option<Operation> {
        let operation = match self {
            FuzzOperation::Added(path, value) => {
                Operation::added(Path::parse(path).ok()?, value.to_json())
            }
            FuzzOperation::Removed(path) => {
                Operation::removed(Path::parse(path).ok()?, Value::Null).without_old_value()
            }
            FuzzOperation::Modified(path, value) => {
                Operation::modified(Path::parse(path).ok()?, Value::Null, value.to_json())
                    .without_old_value()
            }
        };
        Some(operation)
    }
}

fuzz_target!(|input: FuzzInput| {
    let old = input.old.to_json();
    let new = input.new.to_json();

    let delta = diff(&old, &new);
    assert_eq!(patch(&old, &delta).expect("diff output must apply"), new);

    // A depth limit changes the shape of the delta, never its effect
    let options = DiffOptions {
        max_depth: input.max_depth.map(usize::from),
    };
    let shallow = diff_with_options(&old, &new, &options);
    assert_eq!(patch(&old, &shallow).expect("depth-limited diff must apply"), new);

    // The wire form must carry the delta unchanged
    let text = serde_json::to_string(&delta).expect("delta must serialize");
    let back: Vec<Operation> = serde_json::from_str(&text).expect("delta must deserialize");
    assert_eq!(back, delta);

    // Arbitrary operations may fail, but only with a diagnostic
    let stray: Vec<Operation> = input.stray.iter().filter_map(FuzzOperation::to_operation).collect();
    if let Err(diagnostic) = patch(&old, &stray) {
        assert!(diagnostic.operation_index.is_some());
    }
});
