#![no_main]

use libfuzzer_sys::fuzz_target;
use json_delta::{patch_with_options, DeltaDocument, PatchOptions};
use serde_json::json;

fn mutate_delta(data: &[u8]) -> Vec<u8> {
    // Start with a small valid delta document
    let base = r#"{"type":"@peoplesgrocers/json-delta","version":1,"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","created":"2025-01-01T00:00:00Z","operations":[
["modified", "$.name", "Alex", "David"],
["added", "$.tags[1]", "y"],
["removed", "$[\"a.b\"]", 1]
]}"#;

    let mut result = base.as_bytes().to_vec();

    if data.is_empty() {
        return result;
    }

    let max_size = 4096;

    for (i, &byte) in data.iter().take(16).enumerate() {
        if result.len() > max_size {
            break;
        }

        match byte % 8 {
            0 => {
                let pos = (byte as usize) % result.len().max(1);
                result.truncate(pos);
            }
            1 => {
                // Swap an operation name
                if let Some(pos) = result.windows(5).position(|w| w == b"added") {
                    result.splice(pos..pos + 5, b"removed".iter().copied());
                }
            }
            2 => {
                if let Some(pos) = result.iter().position(|&b| b == b'"') {
                    result[pos] = b'X';
                }
            }
            3 => {
                // Break a path
                if let Some(pos) = result.iter().position(|&b| b == b'$') {
                    result[pos] = b'/';
                }
            }
            4 => {
                if let Some(pos) = result.iter().position(|&b| b == b'[' || b == b'{') {
                    result[pos] = b'?';
                }
            }
            5 => {
                let pos = (byte as usize) % (result.len() + 1);
                result.insert(pos, byte);
            }
            6 => {
                if !result.is_empty() {
                    let pos = (byte as usize) % result.len();
                    result.remove(pos);
                }
            }
            _ => {
                let insertion = format!("[\"removed\", \"$[{}]\"],", i);
                let pos = (byte as usize) % (result.len() + 1);
                result.splice(pos..pos, insertion.bytes());
            }
        }
    }

    result
}

fuzz_target!(|data: &[u8]| {
    let content = mutate_delta(data);
    let Ok(text) = std::str::from_utf8(&content) else {
        return;
    };

    let base = json!({"name": "David", "tags": ["x"], "a.b": 1});

    match DeltaDocument::parse(text) {
        Ok(document) => {
            for create_missing in [false, true] {
                let options = PatchOptions {
                    create_missing,
                    verify_old_values: true,
                };
                if let Err(diagnostic) = patch_with_options(&base, &document.operations, &options) {
                    assert!(!diagnostic.description.is_empty());
                }
            }
        }
        Err(diagnostics) => {
            for diagnostic in &diagnostics {
                assert!(!diagnostic.description.is_empty());
            }
        }
    }
});
