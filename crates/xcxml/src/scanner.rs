//! Forward-only tokenizer over any [`Read`] source.
//!
//! The document is read through a fixed-size buffer and never held in memory
//! as a whole. Text is handed out as borrowed fragments of that buffer, so a
//! text run that straddles a refill arrives as two [`XmlEvent::Text`] events.
//! Tag names are collected into a small scratch vector because the matcher
//! needs them whole.
//!
//! Besides elements and text the tokenizer understands just enough markup to
//! get past real-world prologues: processing instructions, comments and
//! declarations (including a bracketed internal subset) are skipped. CDATA
//! content is handed out in fragments just like text, holding back at most a
//! `]]` that might start the terminator. Attributes are skipped without
//! interpretation.
use std::io::{self, Read};

use bstr::ByteSlice;
use memchr::{memchr, memchr_iter, memmem, memrchr};

use crate::{
    error::{LookupError, ParseError, SyntaxError},
    event::XmlEvent,
    options::DEFAULT_BUFFER_SIZE,
};

const CDATA_OPEN: &[u8] = b"[CDATA[";
const CDATA_CLOSE: &[u8] = b"]]>";

/// Streaming XML tokenizer.
///
/// # Examples
///
/// ```rust
/// use xcxml::{Tokenizer, XmlEvent};
///
/// let mut tokenizer = Tokenizer::with_capacity(&b"<a><b/></a>"[..], 4);
/// assert!(matches!(tokenizer.next_event(), Ok(XmlEvent::OpenTag(n)) if n == "a"));
/// assert!(matches!(tokenizer.next_event(), Ok(XmlEvent::OpenTag(n)) if n == "b"));
/// assert!(matches!(tokenizer.next_event(), Ok(XmlEvent::CloseTag(n)) if n == "b"));
/// assert!(matches!(tokenizer.next_event(), Ok(XmlEvent::CloseTag(n)) if n == "a"));
/// assert!(matches!(tokenizer.next_event(), Ok(XmlEvent::EndOfInput)));
/// ```
#[derive(Debug)]
pub struct Tokenizer<R> {
    reader: R,
    buffer: Box<[u8]>,
    pos: usize,
    end: usize,
    eof: bool,

    /// Name of the tag most recently lexed.
    name: Vec<u8>,
    /// Inside a CDATA section, past its `<![CDATA[`.
    in_cdata: bool,
    /// Trailing `]` bytes of the section seen but not yet handed out.
    cdata_brackets: usize,
    /// Set after `<name/>`; the next event is the synthesized close tag.
    pending_close: bool,

    line: usize,
    column: usize,
}

impl<R: Read> Tokenizer<R> {
    /// Creates a tokenizer with a [`DEFAULT_BUFFER_SIZE`] read buffer.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_BUFFER_SIZE)
    }

    /// Creates a tokenizer reading through a buffer of `capacity` bytes.
    ///
    /// A capacity of zero is rounded up to one byte.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            buffer: vec![0; capacity.max(1)].into_boxed_slice(),
            pos: 0,
            end: 0,
            eof: false,
            name: Vec::new(),
            in_cdata: false,
            cdata_brackets: 0,
            pending_close: false,
            line: 1,
            column: 1,
        }
    }

    /// Produces the next event.
    ///
    /// After [`XmlEvent::EndOfInput`] every further call returns
    /// `EndOfInput` again.
    ///
    /// # Errors
    ///
    /// [`LookupError::Io`] if reading fails, [`LookupError::Parse`] for
    /// malformed tags.
    pub fn next_event(&mut self) -> Result<XmlEvent<'_>, LookupError> {
        if self.pending_close {
            self.pending_close = false;
            return Ok(XmlEvent::CloseTag(self.name.as_bstr()));
        }

        loop {
            if self.in_cdata {
                match self.cdata_chunk()? {
                    CDataChunk::Buffered(start, len) => {
                        return Ok(XmlEvent::CData(self.buffer[start..start + len].as_bstr()));
                    }
                    CDataChunk::Brackets(n) => {
                        return Ok(XmlEvent::CData(CDATA_CLOSE[..n].as_bstr()));
                    }
                    CDataChunk::Done => continue,
                }
            }

            let Some(byte) = self.peek()? else {
                return Ok(XmlEvent::EndOfInput);
            };
            if byte != b'<' {
                return Ok(self.text_fragment());
            }
            self.bump();

            match self.peek()? {
                None => return self.fail(SyntaxError::UnterminatedTag),
                Some(b'/') => {
                    self.bump();
                    self.lex_close_tag()?;
                    return Ok(XmlEvent::CloseTag(self.name.as_bstr()));
                }
                Some(b'?') => {
                    self.bump();
                    self.skip_past(b"?>", "processing instruction")?;
                }
                Some(b'!') => {
                    self.bump();
                    self.lex_declaration()?;
                }
                Some(_) => {
                    self.pending_close = self.lex_open_tag()?;
                    return Ok(XmlEvent::OpenTag(self.name.as_bstr()));
                }
            }
        }
    }

    /// Current `(line, column)`, both 1-based; columns count bytes.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    pub(crate) fn error(&self, source: SyntaxError) -> ParseError {
        ParseError {
            source,
            line: self.line,
            column: self.column,
        }
    }

    fn fail<T>(&self, source: SyntaxError) -> Result<T, LookupError> {
        Err(self.error(source).into())
    }

    // --------------------------------------------------------------------------------------------
    // Input
    // --------------------------------------------------------------------------------------------

    /// Makes sure at least one unread byte is buffered. Returns `false` at end
    /// of input.
    fn fill(&mut self) -> io::Result<bool> {
        if self.pos < self.end {
            return Ok(true);
        }
        if self.eof {
            return Ok(false);
        }
        loop {
            match self.reader.read(&mut self.buffer) {
                Ok(0) => {
                    self.eof = true;
                    self.pos = 0;
                    self.end = 0;
                    return Ok(false);
                }
                Ok(read) => {
                    self.pos = 0;
                    self.end = read;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    fn peek(&mut self) -> io::Result<Option<u8>> {
        Ok(if self.fill()? {
            Some(self.buffer[self.pos])
        } else {
            None
        })
    }

    /// Consumes the byte returned by the last successful [`peek`](Self::peek).
    fn bump(&mut self) {
        let byte = self.buffer[self.pos];
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = self.peek()?;
        if byte.is_some() {
            self.bump();
        }
        Ok(byte)
    }

    fn skip_whitespace(&mut self) -> io::Result<()> {
        while let Some(byte) = self.peek()? {
            if !is_whitespace(byte) {
                break;
            }
            self.bump();
        }
        Ok(())
    }

    // --------------------------------------------------------------------------------------------
    // Lexing
    // --------------------------------------------------------------------------------------------

    /// Hands out the buffered text up to the next `<` or the end of the
    /// buffer. Must only be called with a non-`<` byte buffered.
    fn text_fragment(&mut self) -> XmlEvent<'_> {
        let start = self.pos;
        let len = memchr(b'<', &self.buffer[start..self.end]).unwrap_or(self.end - start);
        self.consume(len);
        XmlEvent::Text(self.buffer[start..start + len].as_bstr())
    }

    /// Consumes `len` buffered bytes in one step, keeping the position
    /// current.
    fn consume(&mut self, len: usize) {
        let consumed = &self.buffer[self.pos..self.pos + len];
        match memrchr(b'\n', consumed) {
            Some(last) => {
                self.line += memchr_iter(b'\n', consumed).count();
                self.column = len - last;
            }
            None => self.column += len,
        }
        self.pos += len;
    }

    /// Advances through a CDATA section by at most one buffer's worth.
    ///
    /// A `]` at the end of the buffer may begin the `]]>` terminator, so up to
    /// two of them are held back in `cdata_brackets` and handed out later if
    /// the terminator does not follow.
    fn cdata_chunk(&mut self) -> Result<CDataChunk, LookupError> {
        loop {
            if !self.fill()? {
                return self.fail(SyntaxError::UnterminatedMarkup("CDATA section"));
            }

            let held = self.cdata_brackets;
            if held > 0 {
                match self.buffer[self.pos] {
                    b'>' if held == 2 => {
                        self.bump();
                        self.in_cdata = false;
                        self.cdata_brackets = 0;
                        return Ok(CDataChunk::Done);
                    }
                    b']' if held == 1 => {
                        self.bump();
                        self.cdata_brackets = 2;
                        continue;
                    }
                    // `]]]`: the oldest one is content
                    b']' => {
                        self.bump();
                        return Ok(CDataChunk::Brackets(1));
                    }
                    _ => {
                        self.cdata_brackets = 0;
                        return Ok(CDataChunk::Brackets(held));
                    }
                }
            }

            let start = self.pos;
            let available = &self.buffer[start..self.end];
            if let Some(len) = memmem::find(available, CDATA_CLOSE) {
                self.consume(len + CDATA_CLOSE.len());
                self.in_cdata = false;
                return Ok(if len == 0 {
                    CDataChunk::Done
                } else {
                    CDataChunk::Buffered(start, len)
                });
            }

            let total = available.len();
            let held = available.iter().rev().take(2).take_while(|&&b| b == b']').count();
            self.consume(total);
            self.cdata_brackets = held;
            if total > held {
                return Ok(CDataChunk::Buffered(start, total - held));
            }
        }
    }

    /// Lexes `name ... >` or `name .../>` after the `<`. Returns `true` for a
    /// self-closing tag.
    fn lex_open_tag(&mut self) -> Result<bool, LookupError> {
        self.name.clear();
        loop {
            match self.peek()? {
                None => return self.fail(SyntaxError::UnterminatedTag),
                Some(b) if is_whitespace(b) || b == b'/' || b == b'>' => break,
                Some(b'<') => return self.fail(SyntaxError::UnexpectedByte(b'<')),
                Some(b) => {
                    self.name.push(b);
                    self.bump();
                }
            }
        }
        if self.name.is_empty() {
            return self.fail(SyntaxError::EmptyTagName);
        }

        // Attributes
        loop {
            match self.peek()? {
                None => return self.fail(SyntaxError::UnterminatedTag),
                Some(b'>') => {
                    self.bump();
                    return Ok(false);
                }
                Some(b'/') => {
                    self.bump();
                    return match self.peek()? {
                        Some(b'>') => {
                            self.bump();
                            Ok(true)
                        }
                        Some(b) => self.fail(SyntaxError::UnexpectedByte(b)),
                        None => self.fail(SyntaxError::UnterminatedTag),
                    };
                }
                Some(quote @ (b'"' | b'\'')) => {
                    self.bump();
                    self.skip_quoted(quote)?;
                }
                Some(b'<') => return self.fail(SyntaxError::UnexpectedByte(b'<')),
                Some(_) => self.bump(),
            }
        }
    }

    /// Lexes `name>` after the `</`.
    fn lex_close_tag(&mut self) -> Result<(), LookupError> {
        self.name.clear();
        loop {
            match self.peek()? {
                None => return self.fail(SyntaxError::UnterminatedTag),
                Some(b) if is_whitespace(b) || b == b'>' => break,
                Some(b @ (b'<' | b'/')) => return self.fail(SyntaxError::UnexpectedByte(b)),
                Some(b) => {
                    self.name.push(b);
                    self.bump();
                }
            }
        }
        if self.name.is_empty() {
            return self.fail(SyntaxError::EmptyTagName);
        }

        self.skip_whitespace()?;
        match self.peek()? {
            Some(b'>') => {
                self.bump();
                Ok(())
            }
            Some(b) => self.fail(SyntaxError::UnexpectedByte(b)),
            None => self.fail(SyntaxError::UnterminatedTag),
        }
    }

    /// Lexes whatever follows `<!`. A CDATA section is only opened here; its
    /// content is read by [`cdata_chunk`](Self::cdata_chunk).
    fn lex_declaration(&mut self) -> Result<(), LookupError> {
        match self.peek()? {
            Some(b'-') => {
                self.bump();
                match self.peek()? {
                    Some(b'-') => {
                        self.bump();
                        self.skip_past(b"-->", "comment")
                    }
                    Some(b) => self.fail(SyntaxError::UnexpectedByte(b)),
                    None => self.fail(SyntaxError::UnterminatedMarkup("comment")),
                }
            }
            Some(b'[') => self.open_cdata(),
            Some(_) => self.skip_declaration(),
            None => self.fail(SyntaxError::UnterminatedTag),
        }
    }

    fn open_cdata(&mut self) -> Result<(), LookupError> {
        for &expected in CDATA_OPEN {
            match self.peek()? {
                Some(b) if b == expected => self.bump(),
                Some(b) => return self.fail(SyntaxError::UnexpectedByte(b)),
                None => return self.fail(SyntaxError::UnterminatedMarkup("CDATA section")),
            }
        }
        self.in_cdata = true;
        self.cdata_brackets = 0;
        Ok(())
    }

    /// Skips a `<!DOCTYPE ...>`-style declaration, including a bracketed
    /// internal subset.
    fn skip_declaration(&mut self) -> Result<(), LookupError> {
        let mut depth = 0usize;
        let mut quote = None;
        loop {
            let Some(byte) = self.next_byte()? else {
                return self.fail(SyntaxError::UnterminatedMarkup("declaration"));
            };
            if let Some(q) = quote {
                if byte == q {
                    quote = None;
                }
                continue;
            }
            match byte {
                b'"' | b'\'' => quote = Some(byte),
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => return Ok(()),
                _ => {}
            }
        }
    }

    /// Skips input up to and including `terminator` (at most three bytes).
    fn skip_past(&mut self, terminator: &[u8], what: &'static str) -> Result<(), LookupError> {
        debug_assert!(terminator.len() <= 3);
        let mut recent = [0u8; 3];
        loop {
            let Some(byte) = self.next_byte()? else {
                return self.fail(SyntaxError::UnterminatedMarkup(what));
            };
            recent = [recent[1], recent[2], byte];
            if recent.ends_with(terminator) {
                return Ok(());
            }
        }
    }

    fn skip_quoted(&mut self, quote: u8) -> Result<(), LookupError> {
        loop {
            match self.next_byte()? {
                Some(byte) if byte == quote => return Ok(()),
                Some(_) => {}
                None => return self.fail(SyntaxError::UnterminatedTag),
            }
        }
    }
}

/// Progress through a CDATA section, see [`Tokenizer::cdata_chunk`].
enum CDataChunk {
    /// Content at `buffer[start..start + len]`.
    Buffered(usize, usize),
    /// That many held-back `]` bytes turned out to be content.
    Brackets(usize),
    /// The section ended.
    Done,
}

/// The four whitespace bytes of XML: space, tab, carriage return, line feed.
pub(crate) fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}
