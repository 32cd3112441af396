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

use std::path::PathBuf;

xflags::xflags! {
    cmd json-delta {
        default cmd diff {
            /// JSON file holding the old value
            required old: PathBuf

            /// JSON file holding the new value
            required new: PathBuf

            /// Write the delta here instead of stdout
            optional -o, --output output: PathBuf

            /// Compare containers nested deeper than this as a whole (default 512)
            optional --max-depth max_depth: usize

            /// Source identifier recorded in the delta document
            optional --source source: String

            /// Write a bare array of operations instead of a delta document
            optional --bare
        }

        cmd patch {
            /// JSON file holding the value to patch
            required base: PathBuf

            /// Delta document or bare array of operations
            required delta: PathBuf

            /// Write the patched value here instead of stdout
            optional -o, --output output: PathBuf

            /// Create missing intermediate objects and arrays
            optional --create-missing

            /// Refuse operations whose recorded old value doesn't match
            optional --verify-old-values
        }

        cmd paths {
            /// JSON file to list
            required file: PathBuf

            /// Also list non-empty objects and arrays
            optional --containers

            /// Print containers this many levels down whole
            optional --max-depth max_depth: usize

            /// List object members in key order
            optional --sort-keys

            /// Leave out null values
            optional --exclude-null
        }
    }
}
