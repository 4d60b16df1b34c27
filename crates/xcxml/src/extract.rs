//! Copying the matched element's text into the caller's buffer.
//!
//! [`BoundedCopy`] owns the only writes to the destination: it keeps at most
//! `capacity - 1` data bytes and puts the terminating `0` right after them.
//! [`ValueWriter`] sits in front of it and turns a stream of text fragments
//! into the value: it drops whitespace-only text runs, optionally decodes
//! references and optionally trims the result.
//!
//! Nothing is buffered beyond what still fits in the destination, so a huge
//! matched value costs no more memory than a small one.
use crate::{entity::EntityDecoder, options::LookupOptions, scanner::is_whitespace};

/// Destination with a hard write limit of `capacity - 1` data bytes.
#[derive(Debug)]
pub(crate) struct BoundedCopy<'d> {
    dest: &'d mut [u8],
    len: usize,
}

impl<'d> BoundedCopy<'d> {
    /// `dest` must hold at least the terminator.
    pub(crate) fn new(dest: &'d mut [u8]) -> Self {
        debug_assert!(!dest.is_empty());
        Self { dest, len: 0 }
    }

    fn limit(&self) -> usize {
        self.dest.len().saturating_sub(1)
    }

    pub(crate) fn remaining(&self) -> usize {
        self.limit() - self.len
    }

    /// Appends as much of `bytes` as fits; the rest is silently dropped.
    pub(crate) fn write(&mut self, bytes: &[u8]) {
        let n = bytes.len().min(self.remaining());
        self.dest[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
    }

    fn trim_end(&mut self) {
        while self.len > 0 && is_whitespace(self.dest[self.len - 1]) {
            self.len -= 1;
        }
    }

    /// Writes the terminator and returns the number of data bytes.
    pub(crate) fn terminate(self) -> usize {
        if let Some(terminator) = self.dest.get_mut(self.len) {
            *terminator = 0;
        }
        self.len
    }
}

/// Assembles the value of the matched element from its text runs.
///
/// A run is the text between two tags; it may arrive in several fragments.
/// Whitespace at the front of a run is held back until the run shows
/// non-whitespace content, so runs that are only whitespace (indentation
/// between child elements) never reach the destination. CDATA content counts
/// as content even when it is all whitespace; trimming still applies to it at
/// the edges of the value.
#[derive(Debug)]
pub(crate) struct ValueWriter<'d> {
    out: BoundedCopy<'d>,
    entities: Option<EntityDecoder>,
    trim: bool,

    /// Whitespace seen since the last content byte of the current run.
    pending_ws: Vec<u8>,
    run_has_content: bool,
    value_has_content: bool,

    decoded: Vec<u8>,
}

impl<'d> ValueWriter<'d> {
    pub(crate) fn new(dest: &'d mut [u8], options: &LookupOptions) -> Self {
        Self {
            out: BoundedCopy::new(dest),
            entities: options.decode_entities.then(EntityDecoder::new),
            trim: options.trim_text,
            pending_ws: Vec::new(),
            run_has_content: false,
            value_has_content: false,
            decoded: Vec::new(),
        }
    }

    /// Adds a fragment of the current run.
    pub(crate) fn push_text(&mut self, text: &[u8]) {
        if let Some(decoder) = self.entities.as_mut() {
            let mut decoded = core::mem::take(&mut self.decoded);
            decoded.clear();
            decoder.feed(text, &mut decoded);
            self.push_decoded(&decoded);
            self.decoded = decoded;
        } else {
            self.push_decoded(text);
        }
    }

    /// Adds text that must not be decoded, such as a CDATA section.
    pub(crate) fn push_verbatim(&mut self, text: &[u8]) {
        self.flush_reference();
        self.push_decoded(text);
        if !text.is_empty() {
            self.run_has_content = true;
        }
    }

    /// Marks the end of the current run (a tag was seen).
    pub(crate) fn end_run(&mut self) {
        self.flush_reference();
        if self.run_has_content {
            self.out.write(&self.pending_ws);
        }
        self.pending_ws.clear();
        self.run_has_content = false;
    }

    /// Completes the value and terminates it. Returns its length.
    pub(crate) fn finish(mut self) -> usize {
        self.end_run();
        if self.trim {
            self.out.trim_end();
        }
        self.out.terminate()
    }

    /// Emits an unfinished entity reference verbatim.
    fn flush_reference(&mut self) {
        if let Some(decoder) = self.entities.as_mut() {
            let mut decoded = core::mem::take(&mut self.decoded);
            decoded.clear();
            decoder.flush(&mut decoded);
            self.push_decoded(&decoded);
            self.decoded = decoded;
        }
    }

    fn push_decoded(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            let ws_len = bytes.iter().take_while(|&&b| is_whitespace(b)).count();
            let (ws, rest) = bytes.split_at(ws_len);
            if !ws.is_empty() {
                self.hold_whitespace(ws);
            }

            let content_len = rest.iter().take_while(|&&b| !is_whitespace(b)).count();
            let (content, rest) = rest.split_at(content_len);
            if !content.is_empty() {
                self.out.write(&self.pending_ws);
                self.pending_ws.clear();
                self.out.write(content);
                self.run_has_content = true;
                self.value_has_content = true;
            }
            bytes = rest;
        }
    }

    fn hold_whitespace(&mut self, ws: &[u8]) {
        if self.trim && !self.value_has_content {
            return;
        }
        // Bytes past the destination's remaining room would be cut anyway.
        let room = self.out.remaining().saturating_sub(self.pending_ws.len());
        self.pending_ws.extend_from_slice(&ws[..ws.len().min(room)]);
    }
}
