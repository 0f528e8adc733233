//! Token-level XML equivalence validator (§4.4).
//!
//! Compares two serialized XML documents by their `quick_xml` event stream
//! rather than byte-for-byte, so attribute reordering and whitespace-only
//! text nodes don't register as a difference. This only validates that two
//! renderings carry the same tokens — it says nothing about whether either
//! rendering is valid METS or RDF, which is the adapter's job, not this
//! crate's.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Compare `left` and `right` as XML byte streams for token-level
/// equivalence: same sequence of start/end tags and attributes (attribute
/// order ignored), same non-whitespace text content.
pub fn validate_token_equivalence(left: &[u8], right: &[u8]) -> bool {
    match (tokenize(left), tokenize(right)) {
        (Ok(l), Ok(r)) => l == r,
        _ => false,
    }
}

/// A single normalized token: a tag name with sorted attributes, a closing
/// tag, or non-whitespace text.
#[derive(Debug, PartialEq, Eq)]
enum Token {
    Start(String, Vec<(String, String)>),
    End(String),
    Text(String),
}

fn tag_name(e: &quick_xml::events::BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn sorted_attrs(e: &quick_xml::events::BytesStart<'_>) -> Vec<(String, String)> {
    let mut attrs: Vec<(String, String)> = e
        .attributes()
        .filter_map(|a| a.ok())
        .map(|a| {
            let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
            let value = a.unescape_value().unwrap_or_default().into_owned();
            (key, value)
        })
        .collect();
    attrs.sort();
    attrs
}

fn tokenize(xml: &[u8]) -> Result<Vec<Token>, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);
    let mut tokens = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => {
                tokens.push(Token::Start(tag_name(&e), sorted_attrs(&e)));
            },
            Event::Empty(e) => {
                tokens.push(Token::Start(tag_name(&e), sorted_attrs(&e)));
                tokens.push(Token::End(tag_name(&e)));
            },
            Event::Text(e) => {
                let text = e.unescape().unwrap_or_default().into_owned();
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    tokens.push(Token::Text(trimmed.to_string()));
                }
            },
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                tokens.push(Token::End(name));
            },
            _ => {},
        }
        buf.clear();
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_documents_are_token_equivalent() {
        let xml = br#"<mets><div TYPE="Monograph" ID="1"/></mets>"#;
        assert!(validate_token_equivalence(xml, xml));
    }

    #[test]
    fn attribute_order_is_ignored() {
        let a = br#"<div TYPE="Monograph" ID="1"/>"#;
        let b = br#"<div ID="1" TYPE="Monograph"/>"#;
        assert!(validate_token_equivalence(a, b));
    }

    #[test]
    fn whitespace_only_text_is_ignored() {
        let a = b"<mets>\n  <div/>\n</mets>";
        let b = b"<mets><div/></mets>";
        assert!(validate_token_equivalence(a, b));
    }

    #[test]
    fn differing_text_content_is_detected() {
        let a = b"<title>Example</title>";
        let b = b"<title>Different</title>";
        assert!(!validate_token_equivalence(a, b));
    }
}
