//! Markup events produced by the [`Tokenizer`](crate::Tokenizer).
//!
//! Events borrow from the tokenizer's internal buffers and are only valid
//! until the next call to [`Tokenizer::next_event`](crate::Tokenizer::next_event).
//!
//! # Examples
//!
//! ```
//! use xcxml::{Tokenizer, XmlEvent};
//!
//! let mut tokenizer = Tokenizer::new(&b"<a>42</a>"[..]);
//! let mut seen = Vec::new();
//! loop {
//!     let event = tokenizer.next_event().unwrap();
//!     if event == XmlEvent::EndOfInput {
//!         break;
//!     }
//!     seen.push(format!("{event:?}"));
//! }
//! assert_eq!(seen, ["OpenTag(\"a\")", "Text(\"42\")", "CloseTag(\"a\")"]);
//! ```
use bstr::BStr;

/// One markup event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEvent<'a> {
    /// `<name ...>`; also emitted for `<name .../>`, followed by a
    /// [`CloseTag`](Self::CloseTag) of the same name.
    OpenTag(&'a BStr),
    /// `</name>`
    CloseTag(&'a BStr),
    /// A fragment of character data.
    ///
    /// A single run of text between two tags may arrive as several
    /// consecutive fragments.
    Text(&'a BStr),
    /// A fragment of the content of a `<![CDATA[...]]>` section.
    ///
    /// Like [`Text`](Self::Text), a long section arrives as several
    /// fragments. An empty section produces none.
    CData(&'a BStr),
    /// The document has been read completely. Repeats on further calls.
    EndOfInput,
}

impl XmlEvent<'_> {
    /// Returns `true` if the event is [`EndOfInput`](Self::EndOfInput).
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Self::EndOfInput)
    }
}
