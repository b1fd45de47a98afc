//! SSE line framing.
//!
//! The watch endpoints push newline-delimited frames: comment lines starting
//! with `:` are heartbeats (liveness only), `data:` lines carry a JSON
//! payload, and `event:`/`id:`/`retry:` metadata lines plus blank separators
//! carry nothing we act on. A bare JSON line without a field prefix is also
//! accepted as data.

/// One parsed line from the stream.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Frame<'a> {
    /// `:` comment; refreshes liveness, otherwise ignored.
    Heartbeat,
    /// Payload text to hand to the JSON parser.
    Data(&'a str),
    /// Blank separators and metadata fields.
    Skip,
}

pub(crate) fn parse_line(line: &str) -> Frame<'_> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.is_empty() {
        return Frame::Skip;
    }
    if line.starts_with(':') {
        return Frame::Heartbeat;
    }
    if let Some(rest) = line.strip_prefix("data:") {
        return Frame::Data(rest.strip_prefix(' ').unwrap_or(rest));
    }
    if line.starts_with("event:") || line.starts_with("id:") || line.starts_with("retry:") {
        return Frame::Skip;
    }
    Frame::Data(line)
}

/// Splits arbitrary byte chunks into complete lines, holding the remainder
/// until its newline arrives.
#[derive(Default)]
pub(crate) struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.push_str(&String::from_utf8_lossy(chunk));
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.find('\n') {
            let rest = self.pending.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.pending, rest);
            line.pop(); // trailing '\n'
            lines.push(line);
        }
        lines
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
