#![no_main]

use libfuzzer_sys::fuzz_target;
use json_delta::{DeltaDocument, Path};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Whatever parses must print back to a path that parses to the same thing
    if let Ok(path) = Path::parse(text) {
        let printed = path.to_string();
        let reparsed = Path::parse(&printed).expect("printed path must parse");
        assert_eq!(reparsed, path);
    }

    // Malformed deltas are reported, never panicked on
    if let Err(diagnostics) = DeltaDocument::parse(text) {
        assert!(!diagnostics.is_empty());
        for diagnostic in &diagnostics {
            assert!(!diagnostic.description.is_empty());
        }
    }
});
