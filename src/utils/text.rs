//! Text shaping helpers.

/// Keep at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Cut to `keep` characters plus "..." when the text is longer than `limit`.
pub fn truncate_with_ellipsis(s: &str, limit: usize, keep: usize) -> String {
    if s.chars().count() > limit {
        format!("{}...", truncate_chars(s, keep))
    } else {
        s.to_string()
    }
}

/// Fold runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        let long = "x".repeat(200);
        let cut = truncate_with_ellipsis(&long, 160, 157);
        assert_eq!(cut.chars().count(), 160);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_with_ellipsis("short", 160, 157), "short");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  c "), "a b c");
    }
}
