//! JSON reports written by `mi-decode`

use gdb_mi_records::gdb::{MiValue, RecordKind};
use serde::Serialize;

/// One output line
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    Decoded {
        token: Option<u64>,
        class: String,
        kind: RecordKind,
        value: MiValue,
    },
    Failed {
        line: String,
        error: String,
    },
}

impl Report {
    pub fn is_failure(&self) -> bool {
        matches!(self, Report::Failed { .. })
    }
}
