//! GDB/MI line framing
//!
//! Splits a raw output line into its token, record class, and the
//! `name=value` payload that the classifier understands.

use anyhow::Result;
use regex::Regex;

/// Out-of-band or result record type, by its leading sigil
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSigil {
    /// `^done`, `^error`, ...
    Result,
    /// `*stopped`, `*running`
    Exec,
    /// `+download`
    Status,
    /// `=breakpoint-created`, ...
    Notify,
}

/// One framed record line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedLine<'a> {
    pub token: Option<u64>,
    pub sigil: RecordSigil,
    pub class: &'a str,
    pub payload: Option<&'a str>,
}

pub struct LineFramer {
    // [token]<sigil><class>[,payload]
    record_pattern: Regex,
}

impl LineFramer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            record_pattern: Regex::new(r"^(\d*)([\^*+=])([\w-]+)(?:,(.*))?$")?,
        })
    }

    /// Frame a line; prompts, blank lines and stream output yield `None`
    pub fn frame<'a>(&self, line: &'a str) -> Option<FramedLine<'a>> {
        let line = line.trim();
        if line.is_empty() || line == "(gdb)" {
            return None;
        }

        let caps = self.record_pattern.captures(line)?;
        let sigil = match caps.get(2)?.as_str() {
            "^" => RecordSigil::Result,
            "*" => RecordSigil::Exec,
            "+" => RecordSigil::Status,
            _ => RecordSigil::Notify,
        };
        Some(FramedLine {
            token: caps.get(1).and_then(|m| m.as_str().parse().ok()),
            sigil,
            class: caps.get(3)?.as_str(),
            payload: caps.get(4).map(|m| m.as_str()),
        })
    }
}
