//! GDB Machine Interface (MI) Value Parser
//!
//! Recursive-descent parser for the `name=value` payload of MI result
//! records. The grammar is:
//!
//! ```text
//! record := name '=' value
//! name   := ('A'-'Z' | 'a'-'z' | '-' | '_')+
//! value  := object | array | string
//! object := '{' (record (',' record)*)? '}'
//! array  := '[' (object (',' object)*)? ']'
//! string := '"' (escaped-char | plain-char)* '"'
//! ```
//!
//! The cursor only moves forward, so parsing is linear in the record length.

use crate::gdb::error::{Expected, MiError, Result};
use crate::gdb::types::*;
use tracing::trace;

/// GDB/MI value parser
#[derive(Debug, Clone, Default)]
pub struct MiParser {
    config: ParserConfig,
}

impl MiParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse the first top-level `name=value` pair of a record.
    ///
    /// The value must be followed by the end of the record or a `,`;
    /// anything after the comma is not examined.
    pub fn parse_result(&self, input: &str) -> Result<(String, MiValue)> {
        let mut cursor = Cursor::new(input, &self.config);
        let result = cursor.name_and_value()?;
        match cursor.peek() {
            None | Some(b',') => Ok(result),
            Some(_) => cursor.fail(Expected::Terminator),
        }
    }

    /// Parse every comma-separated top-level `name=value` pair of a record
    pub fn parse_results(&self, input: &str) -> Result<Vec<(String, MiValue)>> {
        let mut cursor = Cursor::new(input, &self.config);
        let mut results = Vec::new();

        cursor.skip_spaces();
        if cursor.peek().is_none() {
            return Ok(results);
        }

        loop {
            results.push(cursor.name_and_value()?);
            match cursor.peek() {
                None => return Ok(results),
                Some(b',') => cursor.bump(),
                Some(_) => return cursor.fail(Expected::Terminator),
            }
        }
    }
}

/// Digits never appear in names
fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'-' || c == b'_'
}

/// Forward-only position in one record
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    depth: usize,
    config: &'a ParserConfig,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str, config: &'a ParserConfig) -> Self {
        // An embedded NUL ends the record
        let end = input.find('\0').unwrap_or(input.len());
        Self {
            text: &input[..end],
            pos: 0,
            depth: 0,
            config,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    fn fail<T>(&self, expected: Expected) -> Result<T> {
        trace!(offset = self.pos, %expected, "malformed GDB/MI record");
        Err(MiError::Malformed {
            offset: self.pos,
            expected,
        })
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            trace!(offset = self.pos, limit = self.config.max_depth, "GDB/MI record nested too deeply");
            return Err(MiError::TooDeep {
                offset: self.pos,
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn name_and_value(&mut self) -> Result<(String, MiValue)> {
        self.skip_spaces();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.pos += 1;
        }
        if self.pos == start {
            return self.fail(Expected::Name);
        }
        let name = self.text[start..self.pos].to_string();

        self.skip_spaces();
        if self.peek() != Some(b'=') {
            return self.fail(Expected::Equals);
        }
        self.bump();

        let value = self.value()?;
        Ok((name, value))
    }

    /// Parse one value and skip the spaces that follow it
    fn value(&mut self) -> Result<MiValue> {
        self.skip_spaces();
        let value = match self.peek() {
            Some(b'{') => MiValue::Object(self.object()?),
            Some(b'[') => MiValue::Array(self.array()?),
            Some(b'"') => MiValue::Leaf(self.string()?),
            _ => return self.fail(Expected::Value),
        };
        self.skip_spaces();
        Ok(value)
    }

    fn string(&mut self) -> Result<String> {
        self.bump(); // '"'
        let start = self.pos;
        let len = self.text.len();

        loop {
            match self.peek() {
                None => return self.fail(Expected::ClosingQuote),
                Some(b'"') => break,
                // Escape pairs are consumed whole and kept as-is
                Some(b'\\') if self.pos + 1 < len => self.pos += 2,
                Some(_) => self.pos += 1,
            }
        }

        let raw = &self.text[start..self.pos];
        self.bump(); // '"'

        Ok(match self.config.escape_policy {
            EscapePolicy::Verbatim => raw.to_string(),
            EscapePolicy::Unescape => unescape(raw),
        })
    }

    fn object(&mut self) -> Result<MiObject> {
        self.enter()?;
        self.bump(); // '{'
        let mut obj = MiObject::new();

        self.skip_spaces();
        if self.peek() == Some(b'}') {
            self.bump();
            self.depth -= 1;
            return Ok(obj);
        }

        loop {
            let (name, value) = self.name_and_value()?;
            obj.insert(name, value);
            match self.peek() {
                Some(b',') => self.bump(),
                Some(b'}') => {
                    self.bump();
                    self.depth -= 1;
                    return Ok(obj);
                }
                _ => return self.fail(Expected::ClosingBrace),
            }
        }
    }

    fn array(&mut self) -> Result<Vec<MiObject>> {
        self.enter()?;
        self.bump(); // '['
        let mut items = Vec::new();

        self.skip_spaces();
        if self.peek() == Some(b']') {
            self.bump();
            self.depth -= 1;
            return Ok(items);
        }

        loop {
            self.skip_spaces();
            let element = match self.peek() {
                Some(b'{') => self.object()?,
                Some(c) if self.config.labelled_array_elements && is_name_char(c) => {
                    let (name, value) = self.name_and_value()?;
                    let mut labelled = MiObject::new();
                    labelled.insert(name, value);
                    labelled
                }
                _ => return self.fail(Expected::ArrayElement),
            };
            items.push(element);

            self.skip_spaces();
            match self.peek() {
                Some(b',') => self.bump(),
                Some(b']') => {
                    self.bump();
                    self.depth -= 1;
                    return Ok(items);
                }
                _ => return self.fail(Expected::ClosingBracket),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<(String, MiValue)> {
        MiParser::new().parse_result(input)
    }

    fn expect_malformed(input: &str, expected: Expected) {
        match parse(input) {
            Err(MiError::Malformed { expected: got, .. }) => {
                assert_eq!(got, expected, "input: {}", input)
            }
            other => panic!("Expected malformed error for {}, got {:?}", input, other),
        }
    }

    #[test]
    fn test_parse_string_value() {
        let (name, value) = parse(r#"value="42""#).unwrap();
        assert_eq!(name, "value");
        assert_eq!(value, MiValue::from("42"));
    }

    #[test]
    fn test_parse_object() {
        let (name, value) = parse(r#"bkpt={number="1",type="breakpoint",enabled="y"}"#).unwrap();
        assert_eq!(name, "bkpt");
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["number"].as_leaf().unwrap(), "1");
        assert_eq!(obj["type"].as_leaf().unwrap(), "breakpoint");
        assert_eq!(obj["enabled"].as_leaf().unwrap(), "y");
    }

    #[test]
    fn test_parse_array_of_objects() {
        let (_, value) = parse(r#"stack=[{level="0",func="main"},{level="1",func="foo"}]"#).unwrap();
        let frames = value.as_array().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["func"].as_leaf().unwrap(), "main");
        assert_eq!(frames[1]["level"].int_value(-1).unwrap(), 1);
    }

    #[test]
    fn test_parse_nested() {
        let input = r#"BreakpointTable={nr_rows="1",hdr=[{width="3",col_name="number"}],body=[{number="1",times="0"}]}"#;
        let (_, value) = parse(input).unwrap();
        let table = value.as_object().unwrap();
        assert_eq!(table["hdr"].as_array().unwrap()[0]["col_name"].as_leaf().unwrap(), "number");
        assert_eq!(table["body"].as_array().unwrap()[0]["times"].int_value(-1).unwrap(), 0);
    }

    #[test]
    fn test_empty_containers() {
        let (_, value) = parse("frame={}").unwrap();
        assert_eq!(value, MiValue::Object(MiObject::new()));
        let (_, value) = parse("stack=[]").unwrap();
        assert_eq!(value, MiValue::Array(Vec::new()));
        let (_, value) = parse("stack=[ ]").unwrap();
        assert_eq!(value, MiValue::Array(Vec::new()));
        let (_, value) = parse(r#"value="""#).unwrap();
        assert_eq!(value, MiValue::from(""));
    }

    #[test]
    fn test_whitespace_is_skipped_outside_strings() {
        let (name, value) = parse("\t frame = { addr = \" 0x1 \" , line=\"3\" } ").unwrap();
        assert_eq!(name, "frame");
        let obj = value.as_object().unwrap();
        assert_eq!(obj["addr"].as_leaf().unwrap(), " 0x1 ");
        assert_eq!(obj["line"].as_leaf().unwrap(), "3");
    }

    #[test]
    fn test_escapes_kept_verbatim() {
        let (_, value) = parse(r#"value="a\"b""#).unwrap();
        assert_eq!(value.as_leaf().unwrap(), r#"a\"b"#);
        assert_eq!(value.as_leaf().unwrap().len(), 4);

        let (_, value) = parse(r#"value="C:\\dir\\""#).unwrap();
        assert_eq!(value.as_leaf().unwrap(), r"C:\\dir\\");
    }

    #[test]
    fn test_unescape_policy() {
        let parser = MiParser::with_config(ParserConfig {
            escape_policy: EscapePolicy::Unescape,
            ..ParserConfig::default()
        });
        let (_, value) = parser.parse_result(r#"value="say \"hi\"\n""#).unwrap();
        assert_eq!(value.as_leaf().unwrap(), "say \"hi\"\n");
    }

    #[test]
    fn test_utf8_leaf() {
        let (_, value) = parse("value=\"caf\u{e9} \\\u{4f60}\"").unwrap();
        assert_eq!(value.as_leaf().unwrap(), "caf\u{e9} \\\u{4f60}");
    }

    #[test]
    fn test_duplicate_member_last_wins() {
        let (_, value) = parse(r#"frame={line="1",file="a.c",line="2"}"#).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["line"].as_leaf().unwrap(), "2");
    }

    fn letter_name(mut n: usize) -> String {
        let mut name = String::new();
        for _ in 0..4 {
            name.push((b'a' + (n % 26) as u8) as char);
            n /= 26;
        }
        name
    }

    #[test]
    fn test_large_object() {
        let count = 20_000;
        let members: Vec<String> = (0..count)
            .map(|i| format!(r#"{}="{}""#, letter_name(i), i))
            .collect();
        let input = format!("frame={{{},{}=\"last\"}}", members.join(","), letter_name(0));

        let (_, value) = parse(&input).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), count);
        assert_eq!(obj[letter_name(0).as_str()].as_leaf().unwrap(), "last");
        assert_eq!(obj[letter_name(count - 1).as_str()].int_value(-1).unwrap(), (count - 1) as i64);
        assert_eq!(obj.iter().next().unwrap().0, letter_name(0));
        assert!(obj["zzzzz"].is_unassigned());
    }

    #[test]
    fn test_digits_are_not_name_chars() {
        expect_malformed(r#"x1="a""#, Expected::Equals);
        expect_malformed(r#"1="a""#, Expected::Name);
        expect_malformed(r#"frame={level0="a"}"#, Expected::Equals);

        let (name, _) = parse(r#"asm_insns=[]"#).unwrap();
        assert_eq!(name, "asm_insns");
    }

    #[test]
    fn test_malformed_records() {
        expect_malformed(r#"frame={addr="0x1",args=[}"#, Expected::ArrayElement);
        expect_malformed("", Expected::Name);
        expect_malformed("frame", Expected::Equals);
        expect_malformed("frame=", Expected::Value);
        expect_malformed("frame=abc", Expected::Value);
        expect_malformed(r#"value="abc"#, Expected::ClosingQuote);
        expect_malformed(r#"value="abc\"#, Expected::ClosingQuote);
        expect_malformed(r#"value="abc\""#, Expected::ClosingQuote);
        expect_malformed(r#"frame={addr="0x1""#, Expected::ClosingBrace);
        expect_malformed(r#"frame={addr="0x1";line="2"}"#, Expected::ClosingBrace);
        expect_malformed(r#"stack=[{level="0"}"#, Expected::ClosingBracket);
        expect_malformed(r#"stack=["main"]"#, Expected::ArrayElement);
        expect_malformed(r#"stack=[[]]"#, Expected::ArrayElement);
        expect_malformed(r#"stack=[frame={}]"#, Expected::ArrayElement);
        expect_malformed(r#"value="1"}"#, Expected::Terminator);
        expect_malformed(r#"value="1" x"#, Expected::Terminator);
    }

    #[test]
    fn test_malformed_offset() {
        match parse(r#"frame={addr="0x1",args=[}"#) {
            Err(MiError::Malformed { offset, .. }) => assert_eq!(offset, 24),
            other => panic!("Expected malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_first_pair_only() {
        let (name, value) = parse(r#"value="1",type="int""#).unwrap();
        assert_eq!(name, "value");
        assert_eq!(value, MiValue::from("1"));
        // Only the first pair is examined
        assert!(parse(r#"value="1",garbage"#).is_ok());
    }

    #[test]
    fn test_parse_results() {
        let parser = MiParser::new();
        let results = parser
            .parse_results(r#"reason="breakpoint-hit", frame={addr="0x1"},thread-id="1""#)
            .unwrap();
        let names: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["reason", "frame", "thread-id"]);
        assert!(parser.parse_results("").unwrap().is_empty());
        assert!(parser.parse_results(r#"a="1",b"#).is_err());
        assert!(parser.parse_results(r#"a="1","#).is_err());
    }

    #[test]
    fn test_nul_ends_record() {
        let (_, value) = parse("value=\"1\"\0trailing").unwrap();
        assert_eq!(value, MiValue::from("1"));
        expect_malformed("value=\"1\0\"", Expected::ClosingQuote);
    }

    #[test]
    fn test_labelled_array_elements() {
        let input = r#"stack=[frame={level="0"},frame={level="1"}]"#;
        expect_malformed(input, Expected::ArrayElement);

        let parser = MiParser::with_config(ParserConfig {
            labelled_array_elements: true,
            ..ParserConfig::default()
        });
        let (_, value) = parser.parse_result(input).unwrap();
        let frames = value.as_array().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1]["frame"].as_object().unwrap()["level"].as_leaf().unwrap(), "1");

        let (_, value) = parser
            .parse_result(r#"asm_insns=[src_and_asm_line={line="3",line_asm_insn=[]},{address="0x2"}]"#)
            .unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_depth_limit() {
        let parser = MiParser::with_config(ParserConfig {
            max_depth: 3,
            ..ParserConfig::default()
        });
        assert!(parser.parse_result(r#"a={b={c={}}}"#).is_ok());
        match parser.parse_result(r#"a={b={c={d={}}}}"#) {
            Err(MiError::TooDeep { limit, .. }) => assert_eq!(limit, 3),
            other => panic!("Expected depth error, got {:?}", other),
        }

        let deep = format!("a={}{}", "{a=".repeat(10_000), "}".repeat(10_000));
        assert!(matches!(parse(&deep), Err(MiError::TooDeep { .. })));
    }

    #[test]
    fn test_parse_is_repeatable() {
        let parser = MiParser::new();
        let input = r#"variables=[{name="i",value="3"},{name="s",value="\"x\""}]"#;
        assert_eq!(parser.parse_result(input).unwrap(), parser.parse_result(input).unwrap());
    }
}
