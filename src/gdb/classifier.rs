//! GDB/MI Record Classifier
//!
//! Maps the leading identifier of a result record to its [`RecordKind`].

use crate::gdb::error::{MiError, Result};
use crate::gdb::parser::MiParser;
use crate::gdb::types::*;
use std::collections::HashMap;
use tracing::debug;

/// Classifies result records by their leading identifier
#[derive(Debug, Clone)]
pub struct RecordClassifier {
    parser: MiParser,
    kinds: HashMap<&'static str, RecordKind>,
}

impl RecordClassifier {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        let kinds = RecordKind::ALL
            .iter()
            .map(|kind| (kind.identifier(), *kind))
            .collect();
        Self {
            parser: MiParser::with_config(config),
            kinds,
        }
    }

    pub fn parser(&self) -> &MiParser {
        &self.parser
    }

    /// Look up the kind registered for an identifier
    pub fn kind_of(&self, name: &str) -> Option<RecordKind> {
        self.kinds.get(name).copied()
    }

    /// Parse a record and classify it by its first `name=value` pair
    pub fn classify(&self, record: &str) -> Result<Record> {
        let (name, value) = self.parser.parse_result(record)?;
        match self.kind_of(&name) {
            Some(kind) => Ok(Record { kind, value }),
            None => {
                debug!("Unrecognized GDB/MI record: {}", name);
                Err(MiError::UnrecognizedKind(name))
            }
        }
    }
}

impl Default for RecordClassifier {
    fn default() -> Self {
        Self::new()
    }
}
