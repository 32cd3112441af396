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

pub mod diff;
pub mod patch;
pub mod paths;

use json_delta::{Diagnostic, DiagnosticCode, Value};
use std::path::Path;

pub fn read_text(path: &Path) -> Result<String, Diagnostic> {
    if !path.exists() {
        return Err(Diagnostic::fatal(
            DiagnosticCode::FileNotFound,
            format!("I couldn't find the input file: {}", path.display()),
        )
        .with_advice(
            "Make sure the file path is correct and the file exists. \
             Check for typos in the filename."
                .to_string(),
        ));
    }

    std::fs::read_to_string(path).map_err(|e| {
        Diagnostic::fatal(
            DiagnosticCode::FileNotFound,
            format!("I couldn't read {}: {}", path.display(), e),
        )
    })
}

pub fn read_json(path: &Path) -> Result<Value, Diagnostic> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|e| {
        Diagnostic::from_json_error(&e, &text).with_filename(path.display().to_string())
    })
}

/// Writes `contents` to `output`, or to stdout when there is no output path.
pub fn write_output(output: Option<&Path>, contents: &str) -> Result<(), Diagnostic> {
    match output {
        Some(path) => std::fs::write(path, format!("{}\n", contents)).map_err(|e| {
            Diagnostic::fatal(
                DiagnosticCode::WriteFailed,
                format!("I couldn't write {}: {}", path.display(), e),
            )
        }),
        None => {
            println!("{}", contents);
            Ok(())
        }
    }
}
