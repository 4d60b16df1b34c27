mod lookup_bad;
mod lookup_good;

use crate::{Lookup, LookupError, LookupOptions, lookup_reader};

/// Number of cases each quickcheck property runs.
pub(crate) fn quickcheck_tests() -> u64 {
    if cfg!(any(miri, feature = "test-fast")) {
        10
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    }
}

/// Runs a lookup over an in-memory document and returns the outcome together
/// with the whole destination buffer.
pub(crate) fn lookup_str(
    doc: &str,
    query: &str,
    capacity: usize,
    options: &LookupOptions,
) -> (Result<Lookup, LookupError>, Vec<u8>) {
    let mut buf = vec![0xAA; capacity];
    let result = lookup_reader(doc.as_bytes(), query, &mut buf, options);
    (result, buf)
}

/// The value of a successful lookup, as a string.
pub(crate) fn found(doc: &str, query: &str) -> Option<String> {
    found_with(doc, query, &LookupOptions::default())
}

pub(crate) fn found_with(doc: &str, query: &str, options: &LookupOptions) -> Option<String> {
    match lookup_str(doc, query, 256, options) {
        (Ok(Lookup::Found { len }), buf) => {
            assert_eq!(buf[len], 0, "value must be terminated");
            Some(String::from_utf8(buf[..len].to_vec()).unwrap())
        }
        (Ok(Lookup::NotFound), _) => None,
        (Err(err), _) => panic!("lookup of {query} failed: {err}"),
    }
}
