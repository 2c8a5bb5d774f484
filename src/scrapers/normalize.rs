//! URL normalization and the "looks like an image" heuristic.
//!
//! Both checks are substring tests on the whole URL, not path-component
//! tests. Rule order is significant: rejection keywords beat any match.

use url::Url;

/// Substrings that mark a URL as an image file.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".bmp"];

/// Substrings that suggest an image even without an extension.
pub const IMAGE_KEYWORDS: &[&str] = &[
    "image",
    "img",
    "photo",
    "picture",
    "thumbnail",
    "preview",
    "screenshot",
];

/// Substrings that disqualify a candidate (chrome, not content).
pub const REJECT_KEYWORDS: &[&str] = &["icon", "logo", "avatar", "favicon", "button", "arrow"];

/// Make a URL absolute against `base`.
///
/// - `//host/x` gains an `https:` scheme
/// - `/x` and scheme-less relative paths are joined onto `base`
/// - anything already absolute passes through unchanged
pub fn normalize(url: &str, base: &Url) -> String {
    if url.is_empty() {
        return String::new();
    }
    if url.starts_with("//") {
        return format!("https:{}", url);
    }
    if url.starts_with('/') || !(url.starts_with("http://") || url.starts_with("https://")) {
        return join(base, url);
    }
    url.to_string()
}

/// Normalize only the two forms embed addresses use: `//` and `/`.
pub fn normalize_embed(src: &str, base: &Url) -> String {
    if src.starts_with("//") {
        format!("https:{}", src)
    } else if src.starts_with('/') {
        join(base, src)
    } else {
        src.to_string()
    }
}

/// Resolve `href` against `base`, keeping the raw value if it cannot be joined.
pub fn join(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Heuristic check that a URL points at a content image.
pub fn is_valid_image(url: &str) -> bool {
    if url.len() < 10 {
        return false;
    }
    if url.starts_with("data:") || url.starts_with("blob:") {
        return false;
    }

    let lower = url.to_lowercase();
    let has_extension = IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext));
    let has_keyword = IMAGE_KEYWORDS.iter().any(|kw| lower.contains(kw));
    let rejected = REJECT_KEYWORDS.iter().any(|kw| lower.contains(kw));

    (has_extension || has_keyword) && !rejected
}
