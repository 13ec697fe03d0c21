//! `mi-decode` line decoding

pub mod framer;
pub mod report;

use anyhow::Result;
use framer::LineFramer;
use gdb_mi_records::gdb::{ParserConfig, Record, RecordClassifier};
use report::Report;
use tracing::{debug, warn};

/// Frames and classifies raw GDB/MI output lines
pub struct LineDecoder {
    framer: LineFramer,
    classifier: RecordClassifier,
    all_pairs: bool,
}

impl LineDecoder {
    pub fn new(config: ParserConfig, all_pairs: bool) -> Result<Self> {
        Ok(Self {
            framer: LineFramer::new()?,
            classifier: RecordClassifier::with_config(config),
            all_pairs,
        })
    }

    /// Decode one line into zero or more reports
    pub fn decode_line(&self, line: &str) -> Vec<Report> {
        let Some(framed) = self.framer.frame(line) else {
            return Vec::new();
        };
        let Some(payload) = framed.payload else {
            debug!("No payload in {:?} record {}", framed.sigil, framed.class);
            return Vec::new();
        };

        let decoded = |record: Record| Report::Decoded {
            token: framed.token,
            class: framed.class.to_string(),
            kind: record.kind,
            value: record.value,
        };
        let failed = |error: String| {
            warn!("Failed to decode line: {} - {}", line, error);
            Report::Failed {
                line: line.to_string(),
                error,
            }
        };

        if !self.all_pairs {
            return match self.classifier.classify(payload) {
                Ok(record) => vec![decoded(record)],
                Err(e) => vec![failed(e.to_string())],
            };
        }

        match self.classifier.parser().parse_results(payload) {
            Ok(results) => results
                .into_iter()
                .filter_map(|(name, value)| match self.classifier.kind_of(&name) {
                    Some(kind) => Some(decoded(Record { kind, value })),
                    None => {
                        debug!("Skipping unregistered pair: {}", name);
                        None
                    }
                })
                .collect(),
            Err(e) => vec![failed(e.to_string())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdb_mi_records::gdb::RecordKind;

    #[test]
    fn test_decode_result_line() {
        let decoder = LineDecoder::new(ParserConfig::default(), false).unwrap();
        let reports = decoder.decode_line(r#"3^done,value="42""#);
        assert_eq!(reports.len(), 1);
        match &reports[0] {
            Report::Decoded { token, class, kind, value } => {
                assert_eq!(*token, Some(3));
                assert_eq!(class, "done");
                assert_eq!(*kind, RecordKind::Evaluation);
                assert_eq!(value.int_value(-1).unwrap(), 42);
            }
            other => panic!("Expected decoded report, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_failure() {
        let decoder = LineDecoder::new(ParserConfig::default(), false).unwrap();
        let reports = decoder.decode_line(r#"*stopped,reason="breakpoint-hit",frame={}"#);
        assert_eq!(reports.len(), 1);
        assert!(reports[0].is_failure());
        assert!(decoder.decode_line("(gdb)").is_empty());
        assert!(decoder.decode_line("^running").is_empty());
    }

    #[test]
    fn test_decode_all_pairs() {
        let decoder = LineDecoder::new(ParserConfig::default(), true).unwrap();
        let reports =
            decoder.decode_line(r#"*stopped,reason="breakpoint-hit",frame={level="0"},thread-id="1""#);
        assert_eq!(reports.len(), 1);
        match &reports[0] {
            Report::Decoded { kind, .. } => assert_eq!(*kind, RecordKind::Frame),
            other => panic!("Expected decoded report, got {:?}", other),
        }

        let reports = decoder.decode_line(r#"^done,value="1",frame={"#);
        assert!(reports[0].is_failure());
    }
}
