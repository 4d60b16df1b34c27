use std::io::{self, Read};

use bstr::BString;
use rstest::rstest;

use super::lookup_str;
use crate::{ErrorKind, LookupError, LookupOptions, QueryError, SyntaxError, lookup_reader};

fn parse_error(doc: &str, query: &str) -> (SyntaxError, usize, usize) {
    match lookup_str(doc, query, 32, &LookupOptions::default()).0 {
        Err(LookupError::Parse(err)) => (err.syntax().clone(), err.line, err.column),
        other => panic!("expected a parse error for {doc:?}, got {other:?}"),
    }
}

#[rstest]
#[case::mismatched_close(
    "<r></x>",
    "/r/v",
    SyntaxError::MismatchedCloseTag { expected: BString::from("r"), found: BString::from("x") },
    1,
    8
)]
#[case::close_without_open("</r>", "/r", SyntaxError::UnexpectedCloseTag(BString::from("r")), 1, 5)]
#[case::second_root("<r/><s/>", "/r/x", SyntaxError::MultipleRoots(BString::from("s")), 1, 9)]
#[case::truncated_document(
    "<r><v>1</v>",
    "/r/x",
    SyntaxError::UnclosedElement(BString::from("r")),
    1,
    12
)]
#[case::inside_the_target(
    "<r>\n<v>1",
    "/r/v",
    SyntaxError::UnclosedElement(BString::from("v")),
    2,
    5
)]
#[case::broken_tag_before_match("<r><a b='1></r>", "/r/v", SyntaxError::UnterminatedTag, 1, 16)]
fn malformed_documents(
    #[case] doc: &str,
    #[case] query: &str,
    #[case] expected: SyntaxError,
    #[case] line: usize,
    #[case] column: usize,
) {
    assert_eq!(parse_error(doc, query), (expected, line, column));
}

#[test]
fn failed_lookup_stays_within_capacity() {
    // a failed lookup may have written partial data, but never past capacity
    let (result, buf) = lookup_str("<r><v>abcdefgh", "/r/v", 4, &LookupOptions::default());
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Parse);
    assert_eq!(buf.len(), 4);
}

#[rstest]
#[case("", QueryError::Empty)]
#[case("root_tag/value", QueryError::MissingLeadingSlash)]
#[case("/", QueryError::EmptySegment { position: 0 })]
#[case("/root_tag//value", QueryError::EmptySegment { position: 1 })]
fn invalid_queries(#[case] query: &str, #[case] expected: QueryError) {
    // the query is rejected before the document is looked at
    for doc in ["<root_tag><value>1</value></root_tag>", "</broken"] {
        match lookup_str(doc, query, 8, &LookupOptions::default()).0 {
            Err(LookupError::InvalidQuery(err)) => assert_eq!(err, expected),
            other => panic!("expected an invalid query error, got {other:?}"),
        }
    }
}

#[test]
fn read_failure_mid_document() {
    struct FailAfter(usize);
    impl Read for FailAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0 == 0 {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "gone"));
            }
            let n = buf.len().min(self.0);
            buf[..n].fill(b' ');
            self.0 -= n;
            Ok(n)
        }
    }

    let reader = (&b"<r><a>1</a>"[..]).chain(FailAfter(3));
    let mut buf = [0u8; 8];
    let err = lookup_reader(reader, "/r/b", &mut buf, &LookupOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(matches!(&err, LookupError::Io(e) if e.kind() == io::ErrorKind::ConnectionReset));
}

#[test]
fn interrupted_reads_are_retried() {
    struct Flaky<'a> {
        data: &'a [u8],
        interrupt: bool,
    }
    impl Read for Flaky<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::ErrorKind::Interrupted.into());
            }
            let n = buf.len().min(1);
            self.data.read(&mut buf[..n])
        }
    }

    let reader = Flaky {
        data: b"<r><v>ok</v></r>",
        interrupt: false,
    };
    let mut buf = [0u8; 8];
    let found = lookup_reader(reader, "/r/v", &mut buf, &LookupOptions::default()).unwrap();
    assert!(found.is_found());
    assert_eq!(&buf[..3], b"ok\0");
}

#[test]
fn error_kinds_have_stable_codes() {
    assert_eq!(ErrorKind::InvalidArgument.code(), 1);
    assert_eq!(ErrorKind::InvalidQuery.code(), 2);
    assert_eq!(ErrorKind::Io.code(), 3);
    assert_eq!(ErrorKind::Parse.code(), 4);
}
