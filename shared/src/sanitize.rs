//! Free-text normalization applied before input reaches an outbound call.

/// Longest sanitized value, in characters.
pub const MAX_LENGTH: usize = 100;

fn is_allowed(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ' ' | '-' | '.' | ',' | '\'')
}

/// Strip characters that could change the meaning of an outbound query.
///
/// Keeps letters, digits and a small set of punctuation found in place
/// names, collapses whitespace and caps the length. Never fails.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len().min(MAX_LENGTH));
    let mut count = 0;
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = count > 0;
            continue;
        }
        if !is_allowed(c) {
            continue;
        }
        if pending_space {
            if count + 1 >= MAX_LENGTH {
                break;
            }
            out.push(' ');
            count += 1;
            pending_space = false;
        }
        if count >= MAX_LENGTH {
            break;
        }
        out.push(c);
        count += 1;
    }

    out
}

/// Same as [`sanitize`], treating an absent value as empty.
pub fn sanitize_opt(text: Option<&str>) -> String {
    text.map(sanitize).unwrap_or_default()
}

/// Provider place identifiers are URL-safe tokens.
pub fn sanitize_place_id(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        .take(256)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_place_names() {
        assert_eq!(sanitize("Paris"), "Paris");
        assert_eq!(sanitize("Coeur d'Alene"), "Coeur d'Alene");
        assert_eq!(sanitize("Winston-Salem, NC"), "Winston-Salem, NC");
        assert_eq!(sanitize("São Paulo"), "São Paulo");
        assert_eq!(sanitize("St. Louis"), "St. Louis");
    }

    #[test]
    fn test_collapses_and_trims_whitespace() {
        assert_eq!(sanitize("  New \t York\n City  "), "New York City");
        assert_eq!(sanitize("   "), "");
    }

    #[test]
    fn test_strips_query_breaking_characters() {
        let dirty = "Paris\"; DROP TABLE x;--<b>?a=1&k=2#frag/%20{}[]()|$`\\+";
        let clean = sanitize(dirty);
        for bad in ['&', '"', ';', '<', '>', '?', '=', '#', '/', '%', '{', '}', '[', ']', '(', ')', '|', '$', '`', '\\', '+'] {
            assert!(!clean.contains(bad), "{bad:?} survived in {clean:?}");
        }
        assert!(clean.starts_with("Paris DROP TABLE x"));
    }

    #[test]
    fn test_strips_control_characters() {
        assert_eq!(sanitize("Ro\u{0}me\u{7}"), "Rome");
        assert_eq!(sanitize("Lis\u{202e}bon"), "Lisbon");
    }

    #[test]
    fn test_caps_length_in_chars() {
        let long = "é".repeat(500);
        let clean = sanitize(&long);
        assert_eq!(clean.chars().count(), MAX_LENGTH);

        let spaced = "ab ".repeat(100);
        let clean = sanitize(&spaced);
        assert!(clean.chars().count() <= MAX_LENGTH);
        assert!(!clean.ends_with(' '));
    }

    #[test]
    fn test_absent_input_is_empty() {
        assert_eq!(sanitize_opt(None), "");
        assert_eq!(sanitize_opt(Some(" Oslo ")), "Oslo");
    }

    #[test]
    fn test_place_id() {
        assert_eq!(sanitize_place_id("ChIJD7fiBh9u5kcRYJSMaMOCCwQ"), "ChIJD7fiBh9u5kcRYJSMaMOCCwQ");
        assert_eq!(sanitize_place_id("abc&key=evil"), "abckeyevil");
        assert_eq!(sanitize_place_id("a_b-c"), "a_b-c");
    }
}
