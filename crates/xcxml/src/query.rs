use core::{fmt, str::FromStr};

use bstr::{BStr, BString, ByteSlice};

use crate::error::QueryError;

/// An absolute element path such as `/root_tag/first_lvl/value`.
///
/// Each `/`-separated segment names one element; the first segment names the
/// document root. Segments are compared byte for byte with tag names.
///
/// # Examples
///
/// ```rust
/// use xcxml::{Query, QueryError};
///
/// let query: Query = "/root_tag/outside_value".parse().unwrap();
/// assert_eq!(query.len(), 2);
/// assert_eq!(query.to_string(), "/root_tag/outside_value");
///
/// assert_eq!(Query::parse("root_tag"), Err(QueryError::MissingLeadingSlash));
/// assert_eq!(
///     Query::parse("/root_tag//value"),
///     Err(QueryError::EmptySegment { position: 1 })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    segments: Vec<BString>,
}

impl Query {
    /// Parses a query string.
    ///
    /// # Errors
    ///
    /// Fails if `query` is empty, does not start with `/`, or contains an
    /// empty segment (`//`, a trailing `/`, or just `/`).
    pub fn parse(query: &str) -> Result<Self, QueryError> {
        let Some(rest) = query.strip_prefix('/') else {
            return Err(if query.is_empty() {
                QueryError::Empty
            } else {
                QueryError::MissingLeadingSlash
            });
        };

        let segments = rest
            .split('/')
            .enumerate()
            .map(|(position, segment)| {
                if segment.is_empty() {
                    Err(QueryError::EmptySegment { position })
                } else {
                    Ok(BString::from(segment))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    /// The element names, outermost first.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = &BStr> {
        self.segments.iter().map(|s| s.as_bstr())
    }

    /// The segment at `depth`, where depth 0 is the root.
    #[must_use]
    pub fn segment(&self, depth: usize) -> Option<&BStr> {
        self.segments.get(depth).map(|s| s.as_bstr())
    }

    /// Number of segments. Never zero for a parsed query.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`; provided for symmetry with [`len`](Self::len).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for Query {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
