//! Slug generation.

use std::sync::LazyLock;

use regex::Regex;

/// Slugs are cut to this many characters.
pub const MAX_SLUG_CHARS: usize = 100;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

/// Derive a lowercase, hyphenated slug from a title.
///
/// Returns `None` when nothing word-like survives.
pub fn create_slug(title: &str) -> Option<String> {
    let lowered = title.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    let hyphenated = SEPARATORS.replace_all(&stripped, "-");
    let slug: String = hyphenated.trim_matches('-').chars().take(MAX_SLUG_CHARS).collect();

    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// Trim a URL and accept it only when it is absolute http(s).
pub fn clean_url(url: &str) -> Option<String> {
    let cleaned = url.trim();
    if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
        Some(cleaned.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_slug_basic() {
        assert_eq!(create_slug("Space Race").as_deref(), Some("space-race"));
        assert_eq!(create_slug("Papa's Pizzeria!").as_deref(), Some("papas-pizzeria"));
        assert_eq!(create_slug("  Drift -- Hunters  ").as_deref(), Some("drift-hunters"));
    }

    #[test]
    fn test_create_slug_keeps_underscores_and_digits() {
        assert_eq!(create_slug("Level_2 Boss").as_deref(), Some("level_2-boss"));
    }

    #[test]
    fn test_create_slug_empty() {
        assert_eq!(create_slug("!!!"), None);
        assert_eq!(create_slug(""), None);
    }

    #[test]
    fn test_create_slug_truncates() {
        let title = "a".repeat(250);
        assert_eq!(create_slug(&title).unwrap().chars().count(), MAX_SLUG_CHARS);
    }

    #[test]
    fn test_clean_url() {
        assert_eq!(
            clean_url("  https://cdn.example.com/g/ ").as_deref(),
            Some("https://cdn.example.com/g/")
        );
        assert_eq!(clean_url("//cdn.example.com/g"), None);
        assert_eq!(clean_url("javascript:void(0)"), None);
    }
}
