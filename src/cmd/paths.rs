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
use json_delta::{walk, Diagnostic, Value, WalkOptions};

pub fn run(flags: &flags::Paths) -> Vec<Diagnostic> {
    let value = match read_json(&flags.file) {
        Ok(value) => value,
        Err(diag) => return vec![diag],
    };

    let options = WalkOptions {
        include_containers: flags.containers,
        max_depth: flags.max_depth,
        sort_keys: flags.sort_keys,
        exclude_null: flags.exclude_null,
    };

    match write_output(None, &render(&value, &options)) {
        Ok(()) => Vec::new(),
        Err(diag) => vec![diag],
    }
}

/// One `path = value` line per entry, values as compact JSON.
fn render(value: &Value, options: &WalkOptions) -> String {
    walk(value, options)
        .into_iter()
        .map(|(path, value)| format!("{} = {}", path, value))
        .collect::<Vec<_>>()
        .join("\n")
}
