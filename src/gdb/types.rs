//! GDB/MI Value Tree and Record Type Definitions

use crate::gdb::error::{MiError, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

static UNASSIGNED: MiValue = MiValue::Unassigned;

/// Discriminant of an [`MiValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    Leaf,
    Object,
    Array,
    Unassigned,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueType::Leaf => "leaf",
            ValueType::Object => "object",
            ValueType::Array => "array",
            ValueType::Unassigned => "unassigned",
        };
        f.write_str(s)
    }
}

/// GDB/MI tagged value
///
/// Arrays only ever hold objects; the MI grammar has no other array element.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MiValue {
    Leaf(String),
    Object(MiObject),
    Array(Vec<MiObject>),
    #[default]
    Unassigned,
}

impl MiValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            MiValue::Leaf(_) => ValueType::Leaf,
            MiValue::Object(_) => ValueType::Object,
            MiValue::Array(_) => ValueType::Array,
            MiValue::Unassigned => ValueType::Unassigned,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self, MiValue::Unassigned)
    }

    /// Leaf text, exactly as stored
    pub fn as_leaf(&self) -> Result<&str> {
        match self {
            MiValue::Leaf(s) => Ok(s),
            other => Err(other.mismatch(ValueType::Leaf)),
        }
    }

    pub fn as_object(&self) -> Result<&MiObject> {
        match self {
            MiValue::Object(obj) => Ok(obj),
            other => Err(other.mismatch(ValueType::Object)),
        }
    }

    pub fn as_array(&self) -> Result<&[MiObject]> {
        match self {
            MiValue::Array(items) => Ok(items),
            other => Err(other.mismatch(ValueType::Array)),
        }
    }

    /// Parse the leaf as a base-10 integer.
    ///
    /// Returns `default` when the leaf is not a valid integer; only a
    /// non-leaf value is an error.
    pub fn int_value(&self, default: i64) -> Result<i64> {
        Ok(self.as_leaf()?.parse().unwrap_or(default))
    }

    /// Leaf text with C-style escapes resolved
    pub fn unescaped(&self) -> Result<String> {
        Ok(unescape(self.as_leaf()?))
    }

    fn mismatch(&self, expected: ValueType) -> MiError {
        MiError::TypeMismatch {
            expected,
            found: self.value_type(),
        }
    }
}

impl From<&str> for MiValue {
    fn from(s: &str) -> Self {
        MiValue::Leaf(s.to_string())
    }
}

impl From<String> for MiValue {
    fn from(s: String) -> Self {
        MiValue::Leaf(s)
    }
}

impl From<MiObject> for MiValue {
    fn from(obj: MiObject) -> Self {
        MiValue::Object(obj)
    }
}

impl From<Vec<MiObject>> for MiValue {
    fn from(items: Vec<MiObject>) -> Self {
        MiValue::Array(items)
    }
}

/// Insertion-ordered name -> value mapping with unique names
#[derive(Debug, Clone, Default)]
pub struct MiObject {
    entries: Vec<(String, MiValue)>,
    positions: HashMap<String, usize>,
}

impl MiObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member. A duplicate name replaces the earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: MiValue) {
        let name = name.into();
        match self.positions.get(&name) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.positions.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }

    /// Member lookup; missing names yield [`MiValue::Unassigned`]
    pub fn get(&self, name: &str) -> &MiValue {
        self.positions
            .get(name)
            .map(|&i| &self.entries[i].1)
            .unwrap_or(&UNASSIGNED)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MiValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl PartialEq for MiObject {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Index<&str> for MiObject {
    type Output = MiValue;

    fn index(&self, name: &str) -> &MiValue {
        self.get(name)
    }
}

impl<N: Into<String>> FromIterator<(N, MiValue)> for MiObject {
    fn from_iter<I: IntoIterator<Item = (N, MiValue)>>(iter: I) -> Self {
        let mut obj = MiObject::new();
        for (name, value) in iter {
            obj.insert(name, value);
        }
        obj
    }
}

impl Serialize for MiObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Semantic kind of a result record, keyed by its leading identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    Breakpoint,
    BreakpointTable,
    FrameStack,
    LocalVariables,
    Frame,
    Disassembly,
    Evaluation,
    RegisterNames,
    RegisterValues,
    Memory,
}

impl RecordKind {
    pub const ALL: [RecordKind; 10] = [
        RecordKind::Breakpoint,
        RecordKind::BreakpointTable,
        RecordKind::FrameStack,
        RecordKind::LocalVariables,
        RecordKind::Frame,
        RecordKind::Disassembly,
        RecordKind::Evaluation,
        RecordKind::RegisterNames,
        RecordKind::RegisterValues,
        RecordKind::Memory,
    ];

    /// Leading identifier that introduces this kind of record
    pub fn identifier(&self) -> &'static str {
        match self {
            RecordKind::Breakpoint => "bkpt",
            RecordKind::BreakpointTable => "BreakpointTable",
            RecordKind::FrameStack => "stack",
            RecordKind::LocalVariables => "variables",
            RecordKind::Frame => "frame",
            RecordKind::Disassembly => "asm_insns",
            RecordKind::Evaluation => "value",
            RecordKind::RegisterNames => "register-names",
            RecordKind::RegisterValues => "register-values",
            RecordKind::Memory => "memory",
        }
    }
}

/// Classified result record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub kind: RecordKind,
    pub value: MiValue,
}

/// How escape sequences inside quoted strings end up in leaves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EscapePolicy {
    /// Keep `\x` pairs as the two raw characters
    #[default]
    Verbatim,
    /// Resolve C-style escapes while parsing
    Unescape,
}

/// Parser configuration
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub escape_policy: EscapePolicy,
    /// Accept `name={...}` array elements, stored as `{name: value}` objects
    pub labelled_array_elements: bool,
    /// Maximum object/array nesting
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            escape_policy: EscapePolicy::Verbatim,
            labelled_array_elements: false,
            max_depth: 128,
        }
    }
}

/// Resolve C-style escapes in a GDB/MI string body
///
/// `\NNN` octal escapes are single bytes; GDB writes each byte of a
/// multi-byte UTF-8 character as its own escape.
pub(crate) fn unescape(s: &str) -> String {
    let mut result: Vec<u8> = Vec::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    let mut buf = [0u8; 4];

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let Some(&next) = chars.peek() else {
            result.push(b'\\');
            break;
        };
        let resolved = match next {
            'n' => Some(b'\n'),
            't' => Some(b'\t'),
            'r' => Some(b'\r'),
            '\\' => Some(b'\\'),
            '"' => Some(b'"'),
            'a' => Some(0x07),
            'b' => Some(0x08),
            'f' => Some(0x0c),
            'v' => Some(0x0b),
            'e' => Some(0x1b),
            _ => None,
        };
        if let Some(r) = resolved {
            result.push(r);
            chars.next();
        } else if next.is_digit(8) {
            let mut code = 0u32;
            for _ in 0..3 {
                match chars.peek().and_then(|d| d.to_digit(8)) {
                    Some(d) => {
                        code = code * 8 + d;
                        chars.next();
                    }
                    None => break,
                }
            }
            result.push((code & 0xff) as u8);
        } else {
            result.push(b'\\');
        }
    }

    String::from_utf8_lossy(&result).into_owned()
}
