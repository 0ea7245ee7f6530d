//! Frontmatter Codec
//!
//! Splits a document blob into a YAML metadata block and a Markdown body,
//! and serializes the inverse. The codec is the single place where the two
//! halves of a document meet; everything else works on the parsed form.
//!
//! Round-trip law: `decode(encode(body, metadata))` yields `metadata` and
//! `body` unchanged for any metadata map built from the supported value
//! types. Key order is preserved (the map is insertion-ordered), absent keys
//! are omitted, and explicit `false` / `0` values are always emitted; the
//! `draft` flag in particular must never disappear just because it is false.

use crate::error::{ContentError, ContentResult};
use crate::metadata::Metadata;

const DELIMITER: &str = "---";

/// A decoded document blob: metadata block plus body text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedDocument {
    pub metadata: Metadata,
    pub body: String,
}

/// Decode a raw blob into metadata and body.
///
/// A blob without a leading delimiter line decodes to empty metadata and the
/// full text as body. An opening delimiter without a closing one, or an
/// unparsable metadata block, is a [`ContentError::Parse`] carrying the raw
/// block. The caller decides whether to fall back, never this codec.
pub fn decode(raw: &str) -> ContentResult<ParsedDocument> {
    let Some(after_open) = strip_delimiter_line(raw) else {
        return Ok(ParsedDocument {
            metadata: Metadata::new(),
            body: raw.to_string(),
        });
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == DELIMITER {
            let block = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Ok(ParsedDocument {
                metadata: parse_block(block)?,
                body: body.to_string(),
            });
        }
        offset += line.len();
    }

    Err(ContentError::parse_with_block(
        "unterminated frontmatter block: missing closing delimiter",
        after_open.to_string(),
    ))
}

/// Decode only the metadata block, skipping the body allocation.
///
/// Listing views call this per file; they never need body text.
pub fn decode_metadata(raw: &str) -> ContentResult<Metadata> {
    let Some(after_open) = strip_delimiter_line(raw) else {
        return Ok(Metadata::new());
    };
    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == DELIMITER {
            return parse_block(&after_open[..offset]);
        }
        offset += line.len();
    }
    Err(ContentError::parse_with_block(
        "unterminated frontmatter block: missing closing delimiter",
        after_open.to_string(),
    ))
}

/// Serialize body and metadata back into a single blob.
///
/// Empty metadata yields the body unchanged, unless the body itself opens
/// with a delimiter line; then an explicit empty block is emitted so that
/// decoding stays the exact inverse.
pub fn encode(body: &str, metadata: &Metadata) -> ContentResult<String> {
    if metadata.is_empty() {
        return Ok(if strip_delimiter_line(body).is_some() {
            format!("{DELIMITER}\n{DELIMITER}\n{body}")
        } else {
            body.to_string()
        });
    }

    let yaml = serde_yaml::to_string(metadata)
        .map_err(|e| ContentError::parse(format!("failed to serialize frontmatter: {e}")))?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{body}"))
}

/// If `text` starts with a delimiter line, return the remainder after it.
fn strip_delimiter_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(DELIMITER)?;
    match rest.as_bytes().first() {
        None => Some(""),
        Some(b'\n') => Some(&rest[1..]),
        Some(b'\r') if rest.as_bytes().get(1) == Some(&b'\n') => Some(&rest[2..]),
        _ => None,
    }
}

fn parse_block(block: &str) -> ContentResult<Metadata> {
    if block.trim().is_empty() {
        return Ok(Metadata::new());
    }
    serde_yaml::from_str(block)
        .map_err(|e| ContentError::parse_with_block(e.to_string(), block.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{get_bool, get_str, Value};

    #[test]
    fn decode_plain_text_has_empty_metadata() {
        let doc = decode("Just some prose.\n\nMore prose.").unwrap();
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, "Just some prose.\n\nMore prose.");
    }

    #[test]
    fn decode_splits_metadata_and_body() {
        let raw = "---\ntitle: Hello\ndraft: true\n---\n\n# Heading\n\nBody text.\n";
        let doc = decode(raw).unwrap();
        assert_eq!(get_str(&doc.metadata, "title"), Some("Hello"));
        assert!(get_bool(&doc.metadata, "draft", false));
        assert_eq!(doc.body, "\n# Heading\n\nBody text.\n");
    }

    #[test]
    fn decode_tolerates_all_supported_value_types() {
        let raw = concat!(
            "---\n",
            "title: Post\n",
            "order: 3\n",
            "draft: false\n",
            "subtitle: null\n",
            "testimonial:\n",
            "  quote: Nice\n",
            "results:\n",
            "  - metric: a\n",
            "  - metric: b\n",
            "---\n",
            "body\n",
        );
        let doc = decode(raw).unwrap();
        assert_eq!(
            doc.metadata.get("order"),
            Some(&Value::Number(3.into()))
        );
        assert_eq!(doc.metadata.get("subtitle"), Some(&Value::Null));
        assert_eq!(get_str(&doc.metadata, "results.1.metric"), Some("b"));
    }

    #[test]
    fn decode_unterminated_block_is_parse_error() {
        let err = decode("---\ntitle: Hello\nno closing").unwrap_err();
        match err {
            ContentError::Parse { block, .. } => {
                assert!(block.unwrap().contains("title: Hello"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_malformed_yaml_surfaces_block() {
        let err = decode("---\ntitle: [unclosed\n---\nbody").unwrap_err();
        match err {
            ContentError::Parse { block, .. } => {
                assert_eq!(block.as_deref(), Some("title: [unclosed\n"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_scalar_frontmatter_is_parse_error() {
        // A metadata block must be a mapping, not a bare scalar.
        assert!(decode("---\njust a string\n---\nbody").is_err());
    }

    #[test]
    fn decode_empty_block_is_empty_mapping() {
        let doc = decode("---\n---\nbody text").unwrap();
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, "body text");
    }

    #[test]
    fn decode_metadata_matches_full_decode() {
        let raw = "---\ntitle: Hello\norder: 2\n---\nlong body we do not need\n";
        let meta = decode_metadata(raw).unwrap();
        assert_eq!(meta, decode(raw).unwrap().metadata);
        assert!(decode_metadata("no frontmatter").unwrap().is_empty());
        assert!(decode_metadata("---\nnever closed").is_err());
    }

    #[test]
    fn encode_empty_metadata_returns_body() {
        let out = encode("plain body\n", &Metadata::new()).unwrap();
        assert_eq!(out, "plain body\n");
    }

    #[test]
    fn encode_guards_body_opening_with_delimiter() {
        let body = "---\nlooks like frontmatter\n";
        let out = encode(body, &Metadata::new()).unwrap();
        let doc = decode(&out).unwrap();
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, body);
    }

    #[test]
    fn round_trip_preserves_metadata_and_body() {
        let mut meta = Metadata::new();
        meta.insert("title".into(), "Hello".into());
        meta.insert("draft".into(), Value::Bool(false));
        meta.insert("order".into(), Value::Number(0.into()));
        meta.insert("tags".into(), Value::Sequence(vec!["a".into(), "b".into()]));
        let mut nested = Metadata::new();
        nested.insert("quote".into(), "Great".into());
        nested.insert("author".into(), "Jane".into());
        meta.insert("testimonial".into(), Value::Mapping(nested));

        let body = "\n# Title\n\nSome **bold** text.\n";
        let doc = decode(&encode(body, &meta).unwrap()).unwrap();
        assert_eq!(doc.metadata, meta);
        assert_eq!(doc.body, body);
    }

    #[test]
    fn encode_emits_false_and_zero_explicitly() {
        let mut meta = Metadata::new();
        meta.insert("title".into(), "T".into());
        meta.insert("draft".into(), Value::Bool(false));
        meta.insert("order".into(), Value::Number(0.into()));

        let out = encode("body", &meta).unwrap();
        assert!(out.contains("draft: false"));
        assert!(out.contains("order: 0"));
    }

    #[test]
    fn encode_preserves_key_order() {
        let mut meta = Metadata::new();
        meta.insert("zulu".into(), "z".into());
        meta.insert("alpha".into(), "a".into());
        meta.insert("mike".into(), "m".into());

        let out = encode("", &meta).unwrap();
        let zulu = out.find("zulu").unwrap();
        let alpha = out.find("alpha").unwrap();
        let mike = out.find("mike").unwrap();
        assert!(zulu < alpha && alpha < mike);
    }

    #[test]
    fn delimiter_requires_exact_line() {
        // A ruler of four dashes is body text, not a frontmatter opener.
        let doc = decode("----\nnot frontmatter\n").unwrap();
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, "----\nnot frontmatter\n");
    }

    #[test]
    fn crlf_delimiters_are_accepted() {
        let doc = decode("---\r\ntitle: Hi\r\n---\r\nbody").unwrap();
        assert_eq!(get_str(&doc.metadata, "title"), Some("Hi"));
        assert_eq!(doc.body, "body");
    }
}
