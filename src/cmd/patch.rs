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

use crate::cmd::{read_json, read_text, write_output};
use crate::flags;
use json_delta::{DeltaDocument, Diagnostic, DiagnosticCode, PatchOptions, Patcher};

pub fn run(flags: &flags::Patch) -> Vec<Diagnostic> {
    let delta_name = flags.delta.display().to_string();

    let base = read_json(&flags.base);
    let document = read_text(&flags.delta).map_err(|diag| vec![diag]).and_then(|text| {
        DeltaDocument::parse(&text).map_err(|diagnostics| {
            diagnostics
                .into_iter()
                .map(|diag| diag.with_filename(delta_name.clone()))
                .collect()
        })
    });

    let (base, document) = match (base, document) {
        (Ok(base), Ok(document)) => (base, document),
        (base, document) => {
            let mut diagnostics: Vec<Diagnostic> = base.err().into_iter().collect();
            diagnostics.extend(document.err().unwrap_or_default());
            return diagnostics;
        }
    };

    let patcher = Patcher::new(PatchOptions {
        create_missing: flags.create_missing,
        verify_old_values: flags.verify_old_values,
    });

    let patched = match patcher.patch(&base, &document.operations) {
        Ok(patched) => patched,
        Err(diag) => return vec![diag.with_filename(delta_name)],
    };

    let rendered = match serde_json::to_string_pretty(&patched) {
        Ok(rendered) => rendered,
        Err(e) => {
            return vec![Diagnostic::fatal(
                DiagnosticCode::WriteFailed,
                format!("I couldn't serialize the patched value: {}", e),
            )]
        }
    };

    if let Err(diag) = write_output(flags.output.as_deref(), &rendered) {
        return vec![diag];
    }

    if let Some(output) = &flags.output {
        println!(
            "Applied {} operations, wrote {}",
            document.operations.len(),
            output.display()
        );
    }

    Vec::new()
}
