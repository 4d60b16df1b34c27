use rstest::rstest;

use super::{found, found_with, lookup_str};
use crate::{Lookup, LookupOptions, TextScope};

const DATASET: &str = "<root_tag><first_lvl><second_lvl><value>42</value></second_lvl></first_lvl>\
                       <outside_value>7</outside_value></root_tag>";

const PRETTY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE config [
  <!ENTITY vendor "acme">
]>
<!-- generated -->
<config version="3">
  <server name="primary" tls='yes'>
    <host>db.internal</host>
    <port>5432</port>
    <motd><![CDATA[<welcome & enjoy>]]></motd>
  </server>
  <server name="replica">
    <host>db-2.internal</host>
  </server>
  <limits/>
  <title>Fish &amp; Chips</title>
</config>
"#;

#[rstest]
#[case("/root_tag/first_lvl/second_lvl/value", Some("42"))]
#[case("/root_tag/outside_value", Some("7"))]
#[case("/root_tag/non_existing_tag", None)]
#[case("/root_tag/value", None)]
#[case("/first_lvl", None)]
#[case("/root_tag/first_lvl/second_lvl/value/deeper", None)]
fn dataset(#[case] query: &str, #[case] expected: Option<&str>) {
    assert_eq!(found(DATASET, query).as_deref(), expected);
}

#[rstest]
#[case::skips_prolog_and_attributes("/config/server/host", Some("db.internal"))]
#[case::first_server_wins("/config/server/port", Some("5432"))]
#[case::cdata_is_verbatim("/config/server/motd", Some("<welcome & enjoy>"))]
#[case::self_closing("/config/limits", Some(""))]
#[case::entities_raw_by_default("/config/title", Some("Fish &amp; Chips"))]
#[case::indentation_is_not_text("/config/server", Some(""))]
#[case::missing("/config/client", None)]
fn pretty_document(#[case] query: &str, #[case] expected: Option<&str>) {
    assert_eq!(found(PRETTY, query).as_deref(), expected);
}

#[test]
fn entity_decoding_is_opt_in() {
    let options = LookupOptions {
        decode_entities: true,
        ..Default::default()
    };
    assert_eq!(found_with(PRETTY, "/config/title", &options).as_deref(), Some("Fish & Chips"));
    // CDATA content is never decoded
    assert_eq!(
        found_with("<a><![CDATA[&amp;]]></a>", "/a", &options).as_deref(),
        Some("&amp;")
    );
}

#[rstest]
#[case::alone("<v><![CDATA[   ]]></v>", "   ")]
#[case::between_tags("<v>a<b/>\n<![CDATA[ ]]>\n<c/>b</v>", "a\n \nb")]
#[case::empty("<v><![CDATA[]]></v>", "")]
fn whitespace_in_cdata_is_kept(#[case] doc: &str, #[case] expected: &str) {
    assert_eq!(found(doc, "/v").as_deref(), Some(expected));
}

#[rstest]
fn large_cdata_streams_through_a_small_buffer(#[values(1, 16, 4096)] buffer_size: usize) {
    let filler = "]x]]".repeat(64 * 1024);
    let doc = format!(
        "<r><skip><![CDATA[{filler}]]></skip><v>1</v><w><![CDATA[{filler}]]></w></r>"
    );
    let options = LookupOptions {
        buffer_size,
        ..Default::default()
    };
    assert_eq!(found_with(&doc, "/r/v", &options).as_deref(), Some("1"));

    let (result, buf) = lookup_str(&doc, "/r/w", 9, &options);
    assert_eq!(result.unwrap(), Lookup::Found { len: 8 });
    assert_eq!(&buf, b"]x]]]x]]\0");
}

#[test]
fn descendant_text_of_a_container() {
    let options = LookupOptions {
        text_scope: TextScope::Descendants,
        ..Default::default()
    };
    assert_eq!(
        found_with(PRETTY, "/config/server", &options).as_deref(),
        Some("db.internal5432<welcome & enjoy>")
    );
}

#[rstest]
#[case("<v>  42  </v>", "  42  ", "42")]
#[case("<v>\n\t42\n</v>", "\n\t42\n", "42")]
#[case("<v> a <b/> b </v>", " a  b ", "a  b")]
fn trimming(#[case] doc: &str, #[case] raw: &str, #[case] trimmed: &str) {
    assert_eq!(found(doc, "/v").as_deref(), Some(raw));
    let options = LookupOptions {
        trim_text: true,
        ..Default::default()
    };
    assert_eq!(found_with(doc, "/v", &options).as_deref(), Some(trimmed));
}

#[test]
fn cursor_retracts_after_a_sibling_branch() {
    let doc = "<r><x><v>no</v></x><v>yes</v></r>";
    assert_eq!(found(doc, "/r/v").as_deref(), Some("yes"));
    assert_eq!(found(doc, "/r/x/v").as_deref(), Some("no"));
}

#[test]
fn prefix_shared_by_several_branches() {
    let doc = "<r><a><b>1</b></a><a><c>2</c></a><a><c>3</c></a></r>";
    assert_eq!(found(doc, "/r/a/b").as_deref(), Some("1"));
    assert_eq!(found(doc, "/r/a/c").as_deref(), Some("2"));
}

#[test]
fn same_name_at_every_level() {
    let doc = "<a>1<a>2<a>3</a></a></a>";
    assert_eq!(found(doc, "/a").as_deref(), Some("1"));
    assert_eq!(found(doc, "/a/a").as_deref(), Some("2"));
    assert_eq!(found(doc, "/a/a/a").as_deref(), Some("3"));
    assert_eq!(found(doc, "/a/a/a/a"), None);
}

#[test]
fn names_compare_byte_for_byte() {
    let doc = "<ns:root><Item>1</Item><item>2</item></ns:root>";
    assert_eq!(found(doc, "/ns:root/item").as_deref(), Some("2"));
    assert_eq!(found(doc, "/root/item"), None);
}

#[test]
fn non_ascii_values_are_copied_as_bytes() {
    assert_eq!(found("<v>grüße</v>", "/v").as_deref(), Some("grüße"));
}

#[test]
fn empty_document_is_not_found() {
    assert_eq!(found("", "/r"), None);
    assert_eq!(found("<?xml version='1.0'?>\n<!-- nothing -->\n", "/r"), None);
}

#[rstest]
fn capacity_one_holds_only_the_terminator(
    #[values("/root_tag/outside_value", "/root_tag/nope")] query: &str,
) {
    let (result, buf) = lookup_str(DATASET, query, 1, &LookupOptions::default());
    match result.unwrap() {
        Lookup::Found { len } => {
            assert_eq!(len, 0);
            assert_eq!(buf, [0]);
        }
        Lookup::NotFound => assert_eq!(buf, [0xAA]),
    }
}

#[rstest]
#[case(2, "4")]
#[case(3, "42")]
#[case(255, "42")]
fn truncates_silently(#[case] capacity: usize, #[case] expected: &str) {
    let (result, buf) = lookup_str(
        DATASET,
        "/root_tag/first_lvl/second_lvl/value",
        capacity,
        &LookupOptions::default(),
    );
    assert_eq!(result.unwrap(), Lookup::Found { len: expected.len() });
    assert_eq!(&buf[..expected.len()], expected.as_bytes());
    assert_eq!(buf[expected.len()], 0);
}
