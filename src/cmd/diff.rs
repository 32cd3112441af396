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

use crate::cmd::{read_json, write_output};
use crate::flags;
use json_delta::{
    diff_with_options, DeltaDocument, Diagnostic, DiagnosticCode, DiffOptions, DEFAULT_MAX_DEPTH,
};

pub fn run(flags: &flags::Diff) -> Vec<Diagnostic> {
    let (old, new) = match (read_json(&flags.old), read_json(&flags.new)) {
        (Ok(old), Ok(new)) => (old, new),
        (old, new) => return old.err().into_iter().chain(new.err()).collect(),
    };

    let options = DiffOptions {
        max_depth: Some(flags.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)),
    };
    let operations = diff_with_options(&old, &new, &options);
    let count = operations.len();

    let rendered = if flags.bare {
        serde_json::to_string_pretty(&operations)
    } else {
        serde_json::to_string_pretty(&DeltaDocument::new(operations, flags.source.clone()))
    };
    let rendered = match rendered {
        Ok(rendered) => rendered,
        Err(e) => {
            return vec![Diagnostic::fatal(
                DiagnosticCode::WriteFailed,
                format!("I couldn't serialize the delta: {}", e),
            )]
        }
    };

    if let Err(diag) = write_output(flags.output.as_deref(), &rendered) {
        return vec![diag];
    }

    if let Some(output) = &flags.output {
        println!("Wrote {} operations to {}", count, output.display());
    }

    Vec::new()
}
