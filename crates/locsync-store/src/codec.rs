//! Catalog text format.
//!
//! Reading accepts a superset of JSON: `//` and `/* */` comments and
//! trailing commas before `}` / `]`, plus an optional UTF-8 BOM. Writing
//! always emits strict JSON: two-space indent, in-memory key order, UTF-8,
//! one trailing newline.

use locsync_core::{Branch, Catalog, CatalogError, locale_from_name};
use serde_json::Value;

/// Errors decoding or encoding a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("corrupted catalog: {0}")]
    Corrupt(String),

    #[error("line {line}, column {column}: parse error: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("serialization error: {0}")]
    Serialize(String),
}

fn validate_bytes<'a>(name: &str, bytes: &'a [u8]) -> Result<&'a str, CodecError> {
    if bytes.contains(&0) {
        return Err(CodecError::Corrupt(format!("{name}: contains NUL byte(s)")));
    }
    let text = std::str::from_utf8(bytes).map_err(|_| {
        CodecError::Corrupt(format!("{name}: contains non-UTF-8 byte sequence(s)"))
    })?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Blank out comments and trailing commas so the result is strict JSON.
///
/// Removed characters become spaces (newlines are kept), so parse errors
/// still point at the original line and column. A block comment that is
/// never closed is a parse error at its opening.
pub fn strip_relaxed_syntax(text: &str) -> Result<String, CodecError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;
    let mut pending_comma: Option<usize> = None;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '/' if chars.peek() == Some(&'/') => {
                out.push_str("  ");
                chars.next();
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    out.push(' ');
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                let line = out.matches('\n').count() + 1;
                let column = out.rsplit('\n').next().map_or(0, |tail| tail.chars().count()) + 1;
                out.push_str("  ");
                chars.next();
                let mut previous = '\0';
                let mut closed = false;
                for next in chars.by_ref() {
                    out.push(if next == '\n' { '\n' } else { ' ' });
                    if previous == '*' && next == '/' {
                        closed = true;
                        break;
                    }
                    previous = next;
                }
                if !closed {
                    return Err(CodecError::Parse {
                        line,
                        column,
                        message: "unterminated block comment".to_string(),
                    });
                }
            }
            ',' => {
                pending_comma = Some(out.len());
                out.push(',');
            }
            '}' | ']' => {
                if let Some(index) = pending_comma.take() {
                    out.replace_range(index..index + 1, " ");
                }
                out.push(ch);
            }
            c if c.is_whitespace() => out.push(c),
            c => {
                pending_comma = None;
                if c == '"' {
                    in_string = true;
                }
                out.push(c);
            }
        }
    }
    Ok(out)
}

/// Decode one catalog. `name` is the store name; the locale is derived
/// from it.
pub fn parse_catalog(name: &str, bytes: &[u8]) -> Result<Catalog, CodecError> {
    let text = validate_bytes(name, bytes)?;
    let strict = strip_relaxed_syntax(text)?;
    let value: Value = serde_json::from_str(&strict).map_err(|e| CodecError::Parse {
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
    })?;
    Ok(Catalog::from_value(locale_from_name(name), value)?)
}

/// Encode a tree in the strict form.
pub fn render(root: &Branch) -> Result<String, CodecError> {
    let mut text =
        serde_json::to_string_pretty(root).map_err(|e| CodecError::Serialize(e.to_string()))?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_comments_and_trailing_commas() {
        let text = r#"{
  // header comment
  "general": {
    "title": "Shop // not a comment", /* inline */
    "list": [1, 2,],
  },
}
"#;
        let catalog = parse_catalog("fr.json", text.as_bytes()).expect("relaxed json should parse");
        assert_eq!(catalog.locale(), "fr");
        assert_eq!(
            catalog.into_value(),
            json!({"general": {"title": "Shop // not a comment", "list": [1, 2]}})
        );
    }

    #[test]
    fn keeps_escaped_quotes_and_commas_inside_strings() {
        let text = r#"{"a": "say \"hi\", ok,}", "b": "x,]"}"#;
        let catalog = parse_catalog("en.default.json", text.as_bytes()).expect("should parse");
        assert_eq!(catalog.locale(), "en");
        assert_eq!(catalog.into_value(), json!({"a": "say \"hi\", ok,}", "b": "x,]"}));
    }

    #[test]
    fn strips_byte_order_mark() {
        let mut bytes = vec![0xef, 0xbb, 0xbf];
        bytes.extend_from_slice(br#"{"a": "b"}"#);
        let catalog = parse_catalog("de.json", &bytes).expect("bom should be ignored");
        assert_eq!(catalog.into_value(), json!({"a": "b"}));
    }

    #[test]
    fn parse_errors_keep_original_positions() {
        let text = "{\n  // comment\n  \"a\": oops\n}\n";
        match parse_catalog("it.json", text.as_bytes()) {
            Err(CodecError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_block_comment_is_a_parse_error() {
        let text = "{\"a\": \"b\"}\n  /* never closed";
        match parse_catalog("fr.json", text.as_bytes()) {
            Err(CodecError::Parse {
                line,
                column,
                message,
            }) => {
                assert_eq!((line, column), (2, 3));
                assert!(message.contains("unterminated block comment"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn comment_closing_at_end_of_input_is_accepted() {
        let catalog = parse_catalog("fr.json", b"{\"a\": \"b\"} /* closed */").expect("parse");
        assert_eq!(catalog.into_value(), json!({"a": "b"}));
    }

    #[test]
    fn rejects_nul_and_non_utf8_payloads() {
        assert!(matches!(
            parse_catalog("a.json", b"{\"a\":\"b\"}\0"),
            Err(CodecError::Corrupt(message)) if message.contains("NUL")
        ));
        assert!(matches!(
            parse_catalog("a.json", &[0xff, 0xfe]),
            Err(CodecError::Corrupt(message)) if message.contains("non-UTF-8")
        ));
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(matches!(
            parse_catalog("a.json", b"[1, 2]"),
            Err(CodecError::Catalog(CatalogError::RootNotBranch { found: "array", .. }))
        ));
    }

    #[test]
    fn renders_strict_two_space_form_in_memory_order() {
        let catalog = parse_catalog(
            "sv.json",
            "{\"z\": {\"b\": \"Varukorg\", \"a\": [],}, \"empty\": {}, \"n\": null}".as_bytes(),
        )
        .expect("should parse");
        let text = render(catalog.root()).expect("render");
        insta::assert_snapshot!(text, @r#"
        {
          "z": {
            "b": "Varukorg",
            "a": []
          },
          "empty": {},
          "n": null
        }
        "#);
        assert!(text.ends_with("}\n"));
        assert!(!text.ends_with("\n\n"));
    }

    #[test]
    fn render_does_not_escape_non_ascii() {
        let catalog =
            parse_catalog("da.json", "{\"kurv\": \"Kurvoversigt ækø\"}".as_bytes()).expect("parse");
        let text = render(catalog.root()).expect("render");
        assert_eq!(text, "{\n  \"kurv\": \"Kurvoversigt ækø\"\n}\n");
    }
}
