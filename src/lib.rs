//! GDB/MI Record Parser
//!
//! Decodes the `name=value` payload of GDB/MI result records into a typed
//! value tree and tags it with the kind of record it is (breakpoint, stack,
//! frame, register data, memory, ...).
//!
//! ```
//! use gdb_mi_records::gdb::{RecordClassifier, RecordKind};
//!
//! let classifier = RecordClassifier::new();
//! let record = classifier.classify(r#"frame={level="0",func="main"}"#).unwrap();
//! assert_eq!(record.kind, RecordKind::Frame);
//! assert_eq!(record.value.as_object().unwrap()["func"].as_leaf().unwrap(), "main");
//! ```

pub mod gdb;
