//! The lookup driver: document in, bounded value out.
//!
//! Every call opens its own file, owns its tokenizer, matcher and writer, and
//! returns on the first complete match, so concurrent lookups share nothing
//! but the read-only filesystem.
use std::{fs::File, io::Read, path::Path};

use crate::{
    error::{LookupError, SyntaxError},
    event::XmlEvent,
    extract::ValueWriter,
    matcher::PathMatcher,
    options::LookupOptions,
    query::Query,
    scanner::Tokenizer,
};

/// Successful outcome of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Lookup {
    /// The element was found; its value occupies `dest[..len]` and
    /// `dest[len]` is `0`. Values longer than `dest.len() - 1` bytes are
    /// truncated.
    Found {
        /// Number of value bytes written before the terminator.
        len: usize,
    },
    /// The document was read to the end without a match. The destination
    /// has not been written to.
    NotFound,
}

impl Lookup {
    /// Returns `true` for [`Lookup::Found`].
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Looks up `query` in the XML document at `path` with default options.
///
/// # Examples
///
/// ```no_run
/// use xcxml::{Lookup, lookup};
///
/// let mut buf = [0u8; 255];
/// match lookup("dataset.xml", "/root_tag/first_lvl/second_lvl/value", &mut buf)? {
///     Lookup::Found { len } => println!("found {}", String::from_utf8_lossy(&buf[..len])),
///     Lookup::NotFound => println!("not found"),
/// }
/// # Ok::<(), xcxml::LookupError>(())
/// ```
///
/// # Errors
///
/// See [`lookup_with_options`].
pub fn lookup<P: AsRef<Path>>(
    path: P,
    query: &str,
    dest: &mut [u8],
) -> Result<Lookup, LookupError> {
    lookup_with_options(path, query, dest, &LookupOptions::default())
}

/// Looks up `query` in the XML document at `path`.
///
/// # Errors
///
/// - [`LookupError::InvalidArgument`] if `dest` is empty or the options are
///   invalid; nothing is written.
/// - [`LookupError::Io`] if the file cannot be opened or read.
/// - [`LookupError::InvalidQuery`] if `query` is not a valid path.
/// - [`LookupError::Parse`] if the document is malformed before the match
///   completes.
pub fn lookup_with_options<P: AsRef<Path>>(
    path: P,
    query: &str,
    dest: &mut [u8],
    options: &LookupOptions,
) -> Result<Lookup, LookupError> {
    check_arguments(dest, options)?;
    let path = path.as_ref();
    log::debug!("looking up {query:?} in {}", path.display());

    let file = File::open(path)?;
    let query = Query::parse(query)?;
    run(Tokenizer::with_capacity(file, options.buffer_size), &query, dest, options)
}

/// Looks up `query` in the XML document read from `reader`.
///
/// This is [`lookup_with_options`] for sources other than files.
///
/// # Examples
///
/// ```rust
/// use xcxml::{Lookup, LookupOptions, lookup_reader};
///
/// let doc = b"<root><a>1</a><b>2</b></root>";
/// let mut buf = [0u8; 8];
/// let found = lookup_reader(&doc[..], "/root/b", &mut buf, &LookupOptions::default()).unwrap();
/// assert_eq!(found, Lookup::Found { len: 1 });
/// assert_eq!(&buf[..2], b"2\0");
/// ```
///
/// # Errors
///
/// As [`lookup_with_options`], except that no file is opened.
pub fn lookup_reader<R: Read>(
    reader: R,
    query: &str,
    dest: &mut [u8],
    options: &LookupOptions,
) -> Result<Lookup, LookupError> {
    check_arguments(dest, options)?;
    let query = Query::parse(query)?;
    run(Tokenizer::with_capacity(reader, options.buffer_size), &query, dest, options)
}

fn check_arguments(dest: &[u8], options: &LookupOptions) -> Result<(), LookupError> {
    if dest.is_empty() {
        return Err(LookupError::InvalidArgument(
            "destination must hold at least the terminator",
        ));
    }
    if options.buffer_size == 0 {
        return Err(LookupError::InvalidArgument("buffer size must be non-zero"));
    }
    Ok(())
}

fn run<R: Read>(
    mut tokenizer: Tokenizer<R>,
    query: &Query,
    dest: &mut [u8],
    options: &LookupOptions,
) -> Result<Lookup, LookupError> {
    let mut matcher = PathMatcher::new(query);
    let mut value = ValueWriter::new(dest, options);

    loop {
        let event = tokenizer.next_event()?;
        match event {
            XmlEvent::OpenTag(name) => {
                if matcher.is_terminal() {
                    value.end_run();
                }
                let opened = matcher.open(name);
                if opened.map_err(|e| tokenizer.error(e))? {
                    log::debug!("{query} matched at line {}", tokenizer.position().0);
                }
            }
            XmlEvent::CloseTag(name) => {
                if matcher.is_terminal() {
                    value.end_run();
                }
                let closed = matcher.close(name);
                if closed.map_err(|e| tokenizer.error(e))? {
                    let len = value.finish();
                    log::debug!("{query} found, {len} bytes");
                    return Ok(Lookup::Found { len });
                }
            }
            XmlEvent::Text(text) => {
                if matcher.captures_text(options.text_scope) {
                    value.push_text(text);
                }
            }
            XmlEvent::CData(text) => {
                if matcher.captures_text(options.text_scope) {
                    value.push_verbatim(text);
                }
            }
            XmlEvent::EndOfInput => {
                if let Some(open) = matcher.innermost() {
                    let err = SyntaxError::UnclosedElement(open.to_owned());
                    return Err(tokenizer.error(err).into());
                }
                log::debug!("{query} not found");
                return Ok(Lookup::NotFound);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, TextScope};

    fn find(doc: &str, query: &str, options: LookupOptions) -> Result<Option<String>, LookupError> {
        let mut buf = [0xAAu8; 64];
        Ok(match lookup_reader(doc.as_bytes(), query, &mut buf, &options)? {
            Lookup::Found { len } => {
                assert_eq!(buf[len], 0);
                Some(String::from_utf8(buf[..len].to_vec()).unwrap())
            }
            Lookup::NotFound => None,
        })
    }

    #[test]
    fn first_match_in_document_order_wins() {
        let doc = "<r><i>1</i><i>2</i></r>";
        assert_eq!(find(doc, "/r/i", LookupOptions::default()).unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn stops_scanning_after_the_match() {
        // the garbage after the match is never read
        let doc = "<r><v>ok</v></oops>";
        assert_eq!(find(doc, "/r/v", LookupOptions::default()).unwrap().as_deref(), Some("ok"));
    }

    #[test]
    fn text_scope_selects_descendant_text() {
        let doc = "<r><p>a<b>b</b>c</p></r>";
        assert_eq!(find(doc, "/r/p", LookupOptions::default()).unwrap().as_deref(), Some("ac"));
        let options = LookupOptions {
            text_scope: TextScope::Descendants,
            ..Default::default()
        };
        assert_eq!(find(doc, "/r/p", options).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn self_closing_target_has_an_empty_value() {
        let value = find("<r><e/></r>", "/r/e", LookupOptions::default()).unwrap();
        assert_eq!(value.as_deref(), Some(""));
    }

    #[test]
    fn unclosed_element_is_a_parse_error() {
        let err = find("<r><v>1", "/r/x", LookupOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("inside <v>"), "{err}");
    }

    #[test]
    fn empty_destination_is_rejected_before_reading() {
        struct Unreadable;
        impl Read for Unreadable {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                unreachable!("input must not be touched")
            }
        }
        let err = lookup_reader(Unreadable, "/r", &mut [], &LookupOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn zero_buffer_size_is_rejected() {
        let options = LookupOptions {
            buffer_size: 0,
            ..Default::default()
        };
        let err = find("<r/>", "/r", options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn not_found_leaves_destination_untouched() {
        let mut buf = [0xAAu8; 8];
        let doc = &b"<r><a>1</a></r>"[..];
        let result = lookup_reader(doc, "/r/b", &mut buf, &LookupOptions::default());
        assert_eq!(result.unwrap(), Lookup::NotFound);
        assert_eq!(buf, [0xAA; 8]);
    }
}
