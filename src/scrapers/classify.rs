//! Game-link classification for landing page anchors.

/// Any of these in the href rejects the link outright.
const DENY_HREF: &[&str] = &["tag", "category", "about", "contact", "privacy", "terms"];

/// Any of these in the href accepts the link.
const ALLOW_HREF: &[&str] = &["game", "play", "online"];

/// Link text containing any of these is navigation, not a game.
const DENY_TITLE: &[&str] = &["home", "about", "contact", "privacy"];

/// Decide whether an anchor points at a game page.
///
/// Rules apply in order and the first decisive one wins, so an href that
/// matches both lists is rejected.
pub fn is_game_link(href: &str, title: &str) -> bool {
    let href = href.to_lowercase();
    if DENY_HREF.iter().any(|p| href.contains(p)) {
        return false;
    }
    if ALLOW_HREF.iter().any(|p| href.contains(p)) {
        return true;
    }

    let title_lower = title.to_lowercase();
    title.chars().count() > 3 && !DENY_TITLE.iter().any(|p| title_lower.contains(p))
}
