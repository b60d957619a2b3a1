//! Response normalization: status + body text into an ordered list of lines.
//!
//! The Volatility REST API wraps plugin output in a JSON object such as
//! `{"process": "PID\tPPID\tImageFileName\n4\t0\tSystem\n..."}`. The first
//! multi-line string value in such an envelope is unwrapped and split, so the
//! caller sees the plugin's table rows directly.

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::Value;
use std::io;

/// Turn a raw response into text lines. Never returns an empty vector.
pub fn normalize_response(status: u16, body: &str) -> Vec<String> {
    if !(200..300).contains(&status) {
        return vec![format!("Error {}: {}", status, body.trim())];
    }

    let lines = match serde_json::from_str::<Value>(body) {
        Ok(value) => normalize_json(&value),
        Err(_) => split_lines(body),
    };

    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

fn normalize_json(value: &Value) -> Vec<String> {
    if let Value::Object(map) = value {
        // Object iteration follows document order (serde_json `preserve_order`).
        let multiline = map.values().find_map(|v| match v {
            Value::String(s) if s.contains('\n') => Some(s.as_str()),
            _ => None,
        });
        if let Some(text) = multiline {
            return split_lines(text);
        }
    }
    vec![render_json(value)]
}

/// Line terminators: `\n`, `\r`, `\r\n`, vertical tab, form feed, the
/// file/group/record separators, NEL, and the Unicode line/paragraph separators.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split on every line terminator, `\r\n` counting as one. A trailing
/// terminator does not produce an empty last line.
fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(text[start..i].to_owned());
        if c == '\r' && matches!(chars.peek(), Some(&(_, '\n'))) {
            chars.next();
        }
        start = chars.peek().map_or(text.len(), |&(j, _)| j);
    }
    if start < text.len() {
        lines.push(text[start..].to_owned());
    }
    lines
}

/// Render a JSON value as compact text with `", "` and `": "` separators,
/// e.g. `{"a": 1, "b": [1, 2]}`. Top-level strings are returned unquoted.
pub fn render_json(value: &Value) -> String {
    if let Value::String(s) = value {
        return s.clone();
    }

    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, SpacedFormatter);
    if value.serialize(&mut ser).is_err() {
        return value.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Compact formatter with a space after each separator.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}
