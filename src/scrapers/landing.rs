//! Landing page link extraction.
//!
//! The portal advertises games in a "recently played" block whose markup
//! is only loosely identifiable. The heuristic is kept behind
//! [`LandingPageParser`] so it can be replaced wholesale when it stops
//! matching.

use std::collections::HashSet;

use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};
use url::Url;

use super::classify::is_game_link;
use super::html::{element_text, select_all, selector};
use super::normalize::{is_valid_image, join, normalize};
use crate::models::GameLink;

/// Finds candidate game links on a landing page.
pub trait LandingPageParser: Send + Sync {
    /// Extract game links in document order. An empty result means "no
    /// games found", not an error.
    fn extract(&self, html: &str, base: &Url) -> Vec<GameLink>;
}

/// Locates a container element in a parsed document.
type SectionFinder = for<'a> fn(&'a Html) -> Option<ElementRef<'a>>;

/// Container lookups, tried in order until one matches.
const SECTION_FINDERS: &[(&str, SectionFinder)] = &[
    ("div class ~ section+recently", div_with_section_recently_class),
    ("section class ~ recently", section_with_recently_class),
    ("text ~ recently", container_of_recently_text),
];

/// Minimum link text length (exclusive).
const MIN_TITLE_CHARS: usize = 2;

/// Parser for the "recently played" block.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecentlyPlayedParser;

impl RecentlyPlayedParser {
    /// Locate the recently-played container, trying each finder in order.
    fn find_section<'a>(doc: &'a Html) -> Option<ElementRef<'a>> {
        SECTION_FINDERS.iter().find_map(|(name, finder)| {
            let found = finder(doc);
            if let Some(el) = found {
                debug!(
                    "Recently played section matched by {} (<{} class=\"{}\">)",
                    name,
                    el.value().name(),
                    el.value().attr("class").unwrap_or_default()
                );
            }
            found
        })
    }
}

impl LandingPageParser for RecentlyPlayedParser {
    fn extract(&self, html: &str, base: &Url) -> Vec<GameLink> {
        let doc = Html::parse_document(html);

        let Some(section) = Self::find_section(&doc) else {
            warn!("Could not find a recently played section on the landing page");
            log_candidates(&doc);
            return Vec::new();
        };

        let Some(anchor_sel) = selector("a[href]") else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for anchor in section.select(&anchor_sel) {
            let href = anchor.value().attr("href").unwrap_or_default().trim();
            let title = element_text(anchor);

            if href.is_empty() || title.chars().count() <= MIN_TITLE_CHARS {
                continue;
            }
            if !is_game_link(href, &title) {
                debug!("Skipping non-game link {} ({})", href, title);
                continue;
            }

            let url = join(base, href);
            if !seen.insert(url.clone()) {
                continue;
            }

            links.push(GameLink {
                title,
                thumbnail: link_thumbnail(anchor, base),
                relative_path: href.to_string(),
                url,
            });
        }

        info!("Found {} game links in the recently played section", links.len());
        links
    }
}

fn class_attr<'a>(el: &ElementRef<'a>) -> &'a str {
    el.value().attr("class").unwrap_or_default()
}

fn div_with_section_recently_class(doc: &Html) -> Option<ElementRef<'_>> {
    select_all(doc, "div[class]").into_iter().find(|el| {
        let class = class_attr(el);
        class.contains("section") && class.contains("recently")
    })
}

fn section_with_recently_class(doc: &Html) -> Option<ElementRef<'_>> {
    select_all(doc, "section[class]")
        .into_iter()
        .find(|el| class_attr(el).contains("recently"))
}

/// Only the first "recently" text node is considered. If it has no
/// `div`/`section` ancestor there is no section.
fn container_of_recently_text(doc: &Html) -> Option<ElementRef<'_>> {
    let node = doc.root_element().descendants().find(|node| {
        node.value()
            .as_text()
            .is_some_and(|text| text.to_lowercase().contains("recently"))
    })?;

    node.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| matches!(el.value().name(), "div" | "section"))
}

/// Emit the elements that came closest to matching, to help retune the
/// heuristic.
fn log_candidates(doc: &Html) {
    for el in select_all(doc, "div[class], section[class]") {
        let class = class_attr(&el);
        if class.contains("recently") || class.contains("section") {
            debug!("Candidate <{} class=\"{}\">", el.value().name(), class);
        }
    }
}

/// Thumbnail for a link: the anchor's own image first, then the first image
/// of each enclosing element up to (not including) `<body>`.
fn link_thumbnail(anchor: ElementRef<'_>, base: &Url) -> Option<String> {
    let img_sel = selector("img")?;

    let scopes = std::iter::once(anchor).chain(
        anchor
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take_while(|el| !matches!(el.value().name(), "body" | "html")),
    );

    for scope in scopes {
        let Some(img) = scope.select(&img_sel).next() else {
            continue;
        };
        if let Some(src) = img.value().attr("src") {
            if is_valid_image(src) {
                return Some(normalize(src, base));
            }
        }
    }
    None
}
