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

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::path::Path;
use crate::value::Value;

/// An ordered sequence of operations turning one value into another.
pub type Delta = Vec<Operation>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Added,
    Removed,
    Modified,
}

impl OpKind {
    pub const ALL_NAMES: &'static [&'static str] = &["added", "removed", "modified"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Added => "added",
            OpKind::Removed => "removed",
            OpKind::Modified => "modified",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "added" => Some(OpKind::Added),
            "removed" => Some(OpKind::Removed),
            "modified" => Some(OpKind::Modified),
            _ => None,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One atomic change at one path.
///
/// `new_value` is present for `added` and `modified`. `old_value` is present
/// for `removed` and `modified` when the producer knew it; patching only
/// consults it when asked to verify. `None` means the field is absent, which
/// is different from `Some(Value::Null)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub op: OpKind,
    pub path: Path,
    pub new_value: Option<Value>,
    pub old_value: Option<Value>,
}

impl Operation {
    pub fn added(path: Path, new_value: Value) -> Self {
        Self {
            op: OpKind::Added,
            path,
            new_value: Some(new_value),
            old_value: None,
        }
    }

    pub fn removed(path: Path, old_value: Value) -> Self {
        Self {
            op: OpKind::Removed,
            path,
            new_value: None,
            old_value: Some(old_value),
        }
    }

    pub fn modified(path: Path, old_value: Value, new_value: Value) -> Self {
        Self {
            op: OpKind::Modified,
            path,
            new_value: Some(new_value),
            old_value: Some(old_value),
        }
    }

    /// Drops the informational old value, as a producer that never saw the
    /// previous state would send it.
    pub fn without_old_value(mut self) -> Self {
        self.old_value = None;
        self
    }
}

// Wire form is a positional array whose length says which values are present:
//   ["added", path, new]
//   ["removed", path] / ["removed", path, old]
//   ["modified", path, new] / ["modified", path, new, old]
impl Serialize for Operation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeSeq;

        let len = match self.op {
            OpKind::Added => 3,
            OpKind::Removed => 2 + self.old_value.is_some() as usize,
            OpKind::Modified => 3 + self.old_value.is_some() as usize,
        };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(self.op.as_str())?;
        seq.serialize_element(&self.path)?;

        match self.op {
            OpKind::Added => {
                seq.serialize_element(self.new_value.as_ref().unwrap_or(&Value::Null))?;
            }
            OpKind::Removed => {
                if let Some(old) = &self.old_value {
                    seq.serialize_element(old)?;
                }
            }
            OpKind::Modified => {
                seq.serialize_element(self.new_value.as_ref().unwrap_or(&Value::Null))?;
                if let Some(old) = &self.old_value {
                    seq.serialize_element(old)?;
                }
            }
        }

        seq.end()
    }
}

struct OperationVisitor;

impl<'de> Visitor<'de> for OperationVisitor {
    type Value = Operation;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON array representing an Operation")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let op_name: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::missing_field("op"))?;
        let op = OpKind::from_name(&op_name)
            .ok_or_else(|| de::Error::unknown_variant(&op_name, OpKind::ALL_NAMES))?;

        let path: Path = seq
            .next_element()?
            .ok_or_else(|| de::Error::missing_field("path"))?;

        let operation = match op {
            OpKind::Added => {
                let new_value: Value = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::missing_field("new_value"))?;
                Operation::added(path, new_value)
            }
            OpKind::Removed => {
                let old_value: Option<Value> = seq.next_element()?;
                Operation {
                    op,
                    path,
                    new_value: None,
                    old_value,
                }
            }
            OpKind::Modified => {
                let new_value: Value = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::missing_field("new_value"))?;
                let old_value: Option<Value> = seq.next_element()?;
                Operation {
                    op,
                    path,
                    new_value: Some(new_value),
                    old_value,
                }
            }
        };

        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::custom(format!(
                "too many fields for a {} operation",
                op
            )));
        }

        Ok(operation)
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(OperationVisitor)
    }
}
