/// Default size of the tokenizer's read buffer, in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Configuration options for a lookup.
///
/// The defaults reproduce the classic behavior: only the matched element's
/// own text is copied, byte for byte, without trimming or entity decoding.
///
/// # Examples
///
/// ```rust
/// use xcxml::{LookupOptions, TextScope};
///
/// let options = LookupOptions {
///     trim_text: true,
///     text_scope: TextScope::Descendants,
///     ..Default::default()
/// };
/// assert!(options.buffer_size > 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "fuzzing", derive(arbitrary::Arbitrary))]
pub struct LookupOptions {
    /// Size of the buffer the document is read through.
    ///
    /// Memory use of a lookup does not depend on the document size, only on
    /// this buffer and the nesting depth. Text runs longer than the buffer
    /// are delivered in several fragments.
    ///
    /// Must be non-zero.
    ///
    /// # Default
    ///
    /// [`DEFAULT_BUFFER_SIZE`]
    pub buffer_size: usize,

    /// Which text nodes make up the value of the matched element.
    ///
    /// # Default
    ///
    /// [`TextScope::Direct`]
    pub text_scope: TextScope,

    /// Whether to strip leading and trailing whitespace from the value.
    ///
    /// Trailing whitespace is stripped from what fits in the destination,
    /// so a value cut in the middle of a space run loses that run as well.
    ///
    /// # Default
    ///
    /// `false`
    pub trim_text: bool,

    /// Whether to decode the predefined entities (`&lt;`, `&gt;`, `&amp;`,
    /// `&quot;`, `&apos;`) and numeric character references.
    ///
    /// References that are unknown or malformed are copied verbatim.
    ///
    /// # Default
    ///
    /// `false`
    pub decode_entities: bool,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            text_scope: TextScope::default(),
            trim_text: false,
            decode_entities: false,
        }
    }
}

/// Selects the text that belongs to a matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "fuzzing", derive(arbitrary::Arbitrary))]
pub enum TextScope {
    /// Only text nodes that are direct children of the matched element.
    #[default]
    Direct,
    /// Every text node inside the matched element, in document order.
    Descendants,
}
