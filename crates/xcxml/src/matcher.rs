//! Incremental matching of the open-element stack against a [`Query`].
//!
//! The matcher keeps the names of all currently open elements and a cursor
//! counting how many leading query segments the stack satisfies. The cursor
//! only advances when an element opens at exactly the depth of the next
//! unmatched segment with that segment's name, and is pulled back whenever
//! the stack shrinks below it. Once the cursor equals the query length the
//! innermost matched element is the target; its close tag completes the
//! match.
use bstr::{BStr, BString};

use crate::{error::SyntaxError, options::TextScope, query::Query};

#[derive(Debug)]
pub(crate) struct PathMatcher<'q> {
    query: &'q Query,
    stack: Vec<BString>,
    cursor: usize,
    seen_root: bool,
}

impl<'q> PathMatcher<'q> {
    pub(crate) fn new(query: &'q Query) -> Self {
        Self {
            query,
            stack: Vec::with_capacity(16),
            cursor: 0,
            seen_root: false,
        }
    }

    /// Records an opened element. Returns `true` if it completes the query.
    pub(crate) fn open(&mut self, name: &BStr) -> Result<bool, SyntaxError> {
        if self.stack.is_empty() && self.seen_root {
            return Err(SyntaxError::MultipleRoots(name.to_owned()));
        }
        self.seen_root = true;

        let depth = self.stack.len();
        let advanced = depth == self.cursor && self.query.segment(depth) == Some(name);
        if advanced {
            self.cursor += 1;
            log::trace!("matched segment {} of {} at <{name}>", self.cursor, self.query.len());
        }
        self.stack.push(name.to_owned());

        Ok(advanced && self.is_terminal())
    }

    /// Records a closed element. Returns `true` if it was the target element.
    pub(crate) fn close(&mut self, name: &BStr) -> Result<bool, SyntaxError> {
        let Some(open) = self.stack.pop() else {
            return Err(SyntaxError::UnexpectedCloseTag(name.to_owned()));
        };
        if open != name {
            return Err(SyntaxError::MismatchedCloseTag {
                expected: open,
                found: name.to_owned(),
            });
        }

        let depth = self.stack.len();
        let was_target = self.is_terminal() && depth + 1 == self.query.len();
        if self.cursor > depth {
            log::trace!("retracting cursor from {} to {depth} at </{name}>", self.cursor);
            self.cursor = depth;
        }
        Ok(was_target)
    }

    /// `true` while the target element is open.
    pub(crate) fn is_terminal(&self) -> bool {
        self.cursor == self.query.len()
    }

    /// Whether a text event at the current position belongs to the value.
    pub(crate) fn captures_text(&self, scope: TextScope) -> bool {
        self.is_terminal()
            && match scope {
                TextScope::Direct => self.stack.len() == self.query.len(),
                TextScope::Descendants => true,
            }
    }

    /// The innermost element that is still open, if any.
    pub(crate) fn innermost(&self) -> Option<&BStr> {
        self.stack.last().map(|name| name.as_ref())
    }
}
