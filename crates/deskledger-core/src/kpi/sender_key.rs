//! Sender grouping keys.

/// Returns the grouping key for a raw `From` value.
///
/// `"Jane Doe <jane@x.com>"` groups as `jane@x.com`; a value without an
/// angle-bracketed address is used unchanged.
#[must_use]
pub fn sender_key(raw: &str) -> &str {
    for (start, _) in raw.match_indices('<') {
        let inner = &raw[start + 1..];
        let Some(first) = inner.chars().next() else {
            break;
        };
        let first_len = first.len_utf8();
        if let Some(end) = inner[first_len..].find('>') {
            return &inner[..first_len + end];
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_and_bare_address_collide() {
        assert_eq!(sender_key("Jane Doe <jane@x.com>"), "jane@x.com");
        assert_eq!(sender_key("jane@x.com"), "jane@x.com");
    }

    #[test]
    fn test_first_bracket_pair_wins() {
        assert_eq!(sender_key("<a@x.com> via <b@x.com>"), "a@x.com");
    }

    #[test]
    fn test_degenerate_brackets() {
        assert_eq!(sender_key("Nobody <>"), "Nobody <>");
        assert_eq!(sender_key("Broken <jane@x.com"), "Broken <jane@x.com");
        assert_eq!(sender_key("x <> y>"), "> y");
        assert_eq!(sender_key("<"), "<");
    }

    #[test]
    fn test_multibyte_address() {
        assert_eq!(sender_key("José <josé@exemplo.br>"), "josé@exemplo.br");
    }
}
