#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use xcxml::{Lookup, LookupOptions, lookup_reader};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    options: LookupOptions,
    query: &'a str,
    capacity: u8,
    document: &'a [u8],
}

fn lookup(input: &Input<'_>, options: &LookupOptions) -> (Option<Lookup>, Vec<u8>) {
    let mut dest = vec![0xAA; usize::from(input.capacity)];
    let result = lookup_reader(input.document, input.query, &mut dest, options);
    if let Ok(Lookup::Found { len }) = result {
        assert!(len < dest.len(), "value overran the destination");
        assert_eq!(dest[len], 0, "value is not terminated");
    }
    (result.ok(), dest)
}

fuzz_target!(|input: Input<'_>| {
    // Arbitrary buffer sizes would mostly exercise the allocator.
    let options = LookupOptions {
        buffer_size: 1 + input.options.buffer_size % 64,
        ..input.options
    };
    let whole = LookupOptions {
        buffer_size: input.document.len().max(1),
        ..options
    };

    // Fragmenting the input must not change the outcome.
    assert_eq!(lookup(&input, &options), lookup(&input, &whole));
});
