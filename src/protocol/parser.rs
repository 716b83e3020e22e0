// Comment-tolerant JSON front end.
//
// Hand-maintained opcode files carry `//` and `/* */` comments and the odd
// trailing comma. Both are removed here so that serde_json sees strict JSON.
// Everything inside string literals is passed through untouched.

/// Produces strict JSON text from a JSONC document.
pub fn normalize_jsonc(source: &str) -> String {
    let without_comments = strip_comments(source.as_bytes());
    let strict = strip_trailing_commas(&without_comments);
    into_string(strict)
}

// --- STAGE 1: COMMENTS ---
pub(crate) fn strip_comments(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];

        if byte == b'"' {
            let end = skip_string(data, i);
            out.extend_from_slice(&data[i..end]);
            i = end;
            continue;
        }

        if byte == b'/' && i + 1 < data.len() {
            match data[i + 1] {
                b'/' => {
                    // Line comment: drop up to (not including) the newline
                    let end = data[i..].iter().position(|&b| b == b'\n').map_or(data.len(), |p| i + p);
                    i = end;
                    continue;
                }
                b'*' => {
                    // Block comment: a single space keeps adjacent tokens apart
                    let end = find_block_end(data, i + 2);
                    out.push(b' ');
                    i = end;
                    continue;
                }
                _ => {}
            }
        }

        out.push(byte);
        i += 1;
    }

    out
}

// --- STAGE 2: TRAILING COMMAS ---
pub(crate) fn strip_trailing_commas(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];

        if byte == b'"' {
            let end = skip_string(data, i);
            out.extend_from_slice(&data[i..end]);
            i = end;
            continue;
        }

        if byte == b',' {
            let next = data[i + 1..].iter().position(|b| !b.is_ascii_whitespace()).map(|p| data[i + 1 + p]);
            if matches!(next, Some(b'}') | Some(b']')) {
                i += 1;
                continue;
            }
        }

        out.push(byte);
        i += 1;
    }

    out
}

/// Returns the index one past the closing quote of the string starting at `start`.
/// An unterminated string runs to the end of the input.
fn skip_string(data: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < data.len() {
        match data[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    data.len()
}

fn find_block_end(data: &[u8], from: usize) -> usize {
    let mut i = from;
    while i + 1 < data.len() {
        if data[i] == b'*' && data[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    data.len()
}

fn into_string(bytes: Vec<u8>) -> String {
    // Only ASCII markers are removed, so this is valid UTF-8 for any &str input
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn parse(source: &str) -> Value {
        serde_json::from_str(&normalize_jsonc(source)).expect("normalized text should be strict JSON")
    }

    #[test]
    fn test_line_and_block_comments() {
        let src = r#"
            // header comment
            {
                /* version block */
                "7.05": { "ActorControl": { "opcode": 306, /* hex 0x132 */ "size": 48 } } // trailing
            }
        "#;
        let value = parse(src);
        assert_eq!(value["7.05"]["ActorControl"]["opcode"], 306);
        assert_eq!(value["7.05"]["ActorControl"]["size"], 48);
    }

    #[test]
    fn test_comment_markers_inside_strings_survive() {
        let value = parse(r#"{ "http://host/*x*/": { "a//b": { "opcode": 1, "size": 2 } } }"#);
        assert!(value.get("http://host/*x*/").is_some());
        assert!(value["http://host/*x*/"].get("a//b").is_some());
    }

    #[test]
    fn test_escaped_quote_does_not_end_string() {
        let value = parse(r#"{ "say \"//hi\"": {} }"#);
        assert!(value.get("say \"//hi\"").is_some());
    }

    #[test]
    fn test_trailing_commas_removed() {
        let value = parse("{ \"7.05\": { \"A\": { \"opcode\": 1, \"size\": 2, }, }, }");
        assert_eq!(value["7.05"]["A"]["size"], 2);
    }

    #[test]
    fn test_comma_before_comment_then_brace() {
        let value = parse("{ \"v\": {}, // last\n }");
        assert!(value.get("v").is_some());
    }

    #[test]
    fn test_unterminated_block_comment_swallows_rest() {
        let text = normalize_jsonc("{ } /* never closed");
        assert_eq!(text.trim(), "{ }");
    }

    #[test]
    fn test_non_ascii_text_preserved() {
        let value = parse("{ \"パケット\": {} // コメント\n }");
        assert!(value.get("パケット").is_some());
    }
}
