//! Streaming XML path lookup into a bounded buffer.
//!
//! Given an XML document and an absolute element path such as
//! `/root_tag/first_lvl/value`, [`lookup`] copies the text of the first
//! matching element into a caller-supplied byte buffer. The value is always
//! terminated by a `0` byte and truncated to fit. A missing element is the
//! normal result [`Lookup::NotFound`], never an error; I/O failures, bad
//! queries and malformed documents are [`LookupError`]s.
//!
//! The document is tokenized as it is read, so documents of any size are
//! handled with a fixed amount of memory.
//!
//! ```rust
//! use xcxml::{Lookup, LookupOptions, lookup_reader};
//!
//! let doc = br#"<?xml version="1.0"?>
//! <root_tag>
//!   <first_lvl><second_lvl><value>42</value></second_lvl></first_lvl>
//!   <outside_value>7</outside_value>
//! </root_tag>"#;
//!
//! let mut buf = [0u8; 255];
//! let options = LookupOptions::default();
//! assert_eq!(
//!     lookup_reader(&doc[..], "/root_tag/outside_value", &mut buf, &options).unwrap(),
//!     Lookup::Found { len: 1 }
//! );
//! assert_eq!(&buf[..2], b"7\0");
//! assert_eq!(
//!     lookup_reader(&doc[..], "/root_tag/non_existing_tag", &mut buf, &options).unwrap(),
//!     Lookup::NotFound
//! );
//! ```

mod entity;
mod error;
mod event;
mod extract;
mod lookup;
mod matcher;
mod options;
mod query;
mod scanner;

#[cfg(test)]
mod tests;

pub use error::{ErrorKind, LookupError, ParseError, QueryError, SyntaxError};
pub use event::XmlEvent;
pub use lookup::{Lookup, lookup, lookup_reader, lookup_with_options};
pub use options::{DEFAULT_BUFFER_SIZE, LookupOptions, TextScope};
pub use query::Query;
pub use scanner::Tokenizer;
