//! Streaming decoder for XML character and entity references.
//!
//! A reference may be split across text fragments, so the decoder keeps the
//! bytes of an unfinished reference (`&` up to, but excluding, `;`) between
//! calls. Anything that does not turn out to be a known reference is passed
//! through unchanged.

/// Longest reference we try to decode: `&#x10FFFF;` plus some slack for
/// leading zeros.
const MAX_REFERENCE_LEN: usize = 16;

#[derive(Debug, Default)]
pub(crate) struct EntityDecoder {
    pending: Vec<u8>,
}

impl EntityDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Decodes `input`, appending the result to `out`.
    pub(crate) fn feed(&mut self, input: &[u8], out: &mut Vec<u8>) {
        for &byte in input {
            if self.pending.is_empty() {
                if byte == b'&' {
                    self.pending.push(byte);
                } else {
                    out.push(byte);
                }
                continue;
            }

            match byte {
                b';' => {
                    match decode(&self.pending[1..]) {
                        Some(ch) => {
                            let mut utf8 = [0u8; 4];
                            out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                        }
                        None => {
                            out.extend_from_slice(&self.pending);
                            out.push(b';');
                        }
                    }
                    self.pending.clear();
                }
                b'&' => {
                    out.append(&mut self.pending);
                    self.pending.push(b'&');
                }
                b'#' | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z'
                    if self.pending.len() < MAX_REFERENCE_LEN =>
                {
                    self.pending.push(byte);
                }
                _ => {
                    out.append(&mut self.pending);
                    out.push(byte);
                }
            }
        }
    }

    /// Emits an unfinished reference verbatim. Called at the end of a text
    /// run, since references never span markup.
    pub(crate) fn flush(&mut self, out: &mut Vec<u8>) {
        out.append(&mut self.pending);
    }
}

/// Decodes the body of a reference, i.e. the bytes between `&` and `;`.
fn decode(body: &[u8]) -> Option<char> {
    match body {
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"amp" => Some('&'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        [b'#', b'x' | b'X', hex @ ..] => char_from_digits(hex, 16),
        [b'#', decimal @ ..] => char_from_digits(decimal, 10),
        _ => None,
    }
}

fn char_from_digits(digits: &[u8], radix: u32) -> Option<char> {
    if digits.is_empty() {
        return None;
    }
    let digits = core::str::from_utf8(digits).ok()?;
    let code = u32::from_str_radix(digits, radix).ok()?;
    char::from_u32(code)
}
