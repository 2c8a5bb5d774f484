//! Game page analysis.
//!
//! Each field is read through an ordered list of probes; the first probe
//! that yields an acceptable value wins and a miss simply leaves the field
//! empty.

use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use super::html::{attr_or_empty, element_text, select_all, select_first};
use super::http_client::Fetch;
use super::normalize::{is_valid_image, normalize, normalize_embed};
use super::store::ScrapeContext;
use crate::models::{
    GameRecord, GameType, IframeRecord, MAX_DESCRIPTION_CHARS, MAX_TAGS,
};
use crate::utils::truncate_chars;

/// Where a probe reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Read {
    /// `content` attribute of a `<meta>` tag.
    Content,
    /// Element text.
    Text,
    /// `src` attribute of an `<img>`.
    Src,
}

/// One selector in a cascade.
#[derive(Debug, Clone, Copy)]
struct Probe {
    css: &'static str,
    read: Read,
}

impl Probe {
    const fn content(css: &'static str) -> Self {
        Self { css, read: Read::Content }
    }

    const fn text(css: &'static str) -> Self {
        Self { css, read: Read::Text }
    }

    const fn src(css: &'static str) -> Self {
        Self { css, read: Read::Src }
    }

    /// Value of the first element matching this probe.
    fn read<'a>(&self, doc: &'a Html) -> Option<(String, ElementRef<'a>)> {
        let el = select_first(doc, self.css)?;
        let value = match self.read {
            Read::Content => attr_or_empty(el, "content"),
            Read::Text => element_text(el),
            Read::Src => attr_or_empty(el, "src"),
        };
        Some((value, el))
    }
}

const DESCRIPTION_PROBES: &[Probe] = &[
    Probe::content(r#"meta[name="description"]"#),
    Probe::text(".game-description"),
    Probe::text(".description"),
    Probe::text(".game-info"),
    Probe::text(".intro"),
    Probe::text("p"),
];

/// Descriptions this short are usually labels, not prose.
const MIN_DESCRIPTION_CHARS: usize = 20;

const KEYWORDS_META: &str = r#"meta[name="keywords"]"#;

const TAG_SELECTORS: &[&str] = &[".tags a", ".tag", ".category", ".game-tags a"];

/// Tags at or above this length are treated as prose.
const MAX_TAG_CHARS: usize = 50;

const CATEGORY_PROBES: &[Probe] = &[
    Probe::text(".breadcrumb a:last-child"),
    Probe::text(".category-name"),
    Probe::text(".game-category"),
];

const RATING_PROBE: Probe = Probe::text(".rating, .score, .stars");

const PLAY_COUNT_PROBE: Probe = Probe::text(".play-count, .views, .plays");

const THUMBNAIL_PROBES: &[Probe] = &[
    Probe::content(r#"meta[property="og:image"]"#),
    Probe::content(r#"meta[name="twitter:image"]"#),
    Probe::src(".game-thumbnail img"),
    Probe::src(".thumbnail img"),
    Probe::src(".game-image img"),
    Probe::src(".preview img"),
    Probe::src(".screenshot img"),
    Probe::src(r#"img[alt*="thumbnail"]"#),
    Probe::src(r#"img[alt*="preview"]"#),
    Probe::src(r#"img[alt*="screenshot"]"#),
    Probe::src(".game-container img"),
    Probe::src("img"),
];

/// Fetches game pages and turns them into [`GameRecord`]s.
pub struct PageAnalyzer<'a> {
    fetcher: &'a dyn Fetch,
    base: Url,
}

impl<'a> PageAnalyzer<'a> {
    pub fn new(fetcher: &'a dyn Fetch, base: Url) -> Self {
        Self { fetcher, base }
    }

    /// Analyze one game page.
    ///
    /// Returns `None` only when the page could not be fetched. Every embed
    /// address found is also added to the context's iframe-source set.
    pub async fn analyze(
        &self,
        ctx: &mut ScrapeContext,
        url: &str,
        title: &str,
        fallback_thumbnail: Option<&str>,
    ) -> Option<GameRecord> {
        let html = self.fetcher.fetch(url).await?;
        let record = parse_game_page(&html, url, title, fallback_thumbnail, &self.base);
        let new_sources = ctx.record_iframes(&record);
        debug!(
            "{}: {} iframe(s), {} new source(s), description {} chars",
            title,
            record.iframes.len(),
            new_sources,
            record.description.chars().count()
        );
        Some(record)
    }
}

/// Extract a [`GameRecord`] from game page HTML.
pub fn parse_game_page(
    html: &str,
    url: &str,
    title: &str,
    fallback_thumbnail: Option<&str>,
    base: &Url,
) -> GameRecord {
    let doc = Html::parse_document(html);

    let iframes = iframes(&doc, base);
    let game_type = iframes.first().map(|f| GameType::from_embed_src(&f.src));
    let (thumbnail, thumbnail_alt) = match thumbnail(&doc, base) {
        Some((src, alt)) => (Some(src), alt),
        None => (
            fallback_thumbnail
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            String::new(),
        ),
    };

    GameRecord {
        title: title.to_string(),
        url: url.to_string(),
        description: description(&doc),
        tags: tags(&doc),
        category: category(&doc),
        rating: RATING_PROBE.read(&doc).map(|(v, _)| v).unwrap_or_default(),
        play_count: PLAY_COUNT_PROBE.read(&doc).map(|(v, _)| v).unwrap_or_default(),
        iframes,
        game_type,
        thumbnail,
        thumbnail_alt,
    }
}

fn iframes(doc: &Html, base: &Url) -> Vec<IframeRecord> {
    select_all(doc, "iframe")
        .into_iter()
        .filter_map(|el| {
            let src = el.value().attr("src").filter(|s| !s.is_empty())?;
            Some(IframeRecord {
                src: normalize_embed(src, base),
                width: attr_or_empty(el, "width"),
                height: attr_or_empty(el, "height"),
                frameborder: attr_or_empty(el, "frameborder"),
                allowfullscreen: attr_or_empty(el, "allowfullscreen"),
                sandbox: attr_or_empty(el, "sandbox"),
            })
        })
        .collect()
}

fn description(doc: &Html) -> String {
    DESCRIPTION_PROBES
        .iter()
        .filter_map(|probe| probe.read(doc))
        .map(|(text, _)| text)
        .find(|text| text.chars().count() > MIN_DESCRIPTION_CHARS)
        .map(|text| truncate_chars(&text, MAX_DESCRIPTION_CHARS))
        .unwrap_or_default()
}

fn tags(doc: &Html) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();

    if let Some(meta) = select_first(doc, KEYWORDS_META) {
        candidates.extend(
            attr_or_empty(meta, "content")
                .split(',')
                .take(MAX_TAGS)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        );
    }

    for css in TAG_SELECTORS {
        candidates.extend(
            select_all(doc, css)
                .into_iter()
                .map(element_text)
                .filter(|t| !t.is_empty() && t.chars().count() < MAX_TAG_CHARS),
        );
    }

    let mut tags: Vec<String> = Vec::new();
    for tag in candidates {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}

fn category(doc: &Html) -> String {
    CATEGORY_PROBES
        .iter()
        .filter_map(|probe| probe.read(doc))
        .map(|(text, _)| text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// First valid thumbnail and, when it came from an `<img>`, its alt text.
fn thumbnail(doc: &Html, base: &Url) -> Option<(String, String)> {
    THUMBNAIL_PROBES.iter().find_map(|probe| {
        let (src, el) = probe.read(doc)?;
        if src.is_empty() || !is_valid_image(&src) {
            return None;
        }
        let alt = match probe.read {
            Read::Src => attr_or_empty(el, "alt"),
            _ => String::new(),
        };
        Some((normalize(&src, base), alt))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    fn base() -> Url {
        Url::parse("https://www.onlinegames.io").unwrap()
    }

    const GAME_PAGE: &str = r#"
        <html>
          <head>
            <meta name="description" content="Race through space dodging asteroids in this fast arcade game.">
            <meta name="keywords" content="space, racing , arcade,,asteroids, html5, extra">
            <meta property="og:image" content="https://cdn.onlinegames.io/images/space-race.jpg">
          </head>
          <body>
            <div class="breadcrumb"><a href="/">Home</a><a href="/c/arcade">Arcade</a></div>
            <div class="tags"><a href="/t/space">space</a><a href="/t/fun">Fun</a></div>
            <div class="rating">4.5/5</div>
            <span class="plays">12.3k plays</span>
            <iframe src="//games.example.com/unity/space-race/index.html" width="800" height="600"
                    frameborder="0" allowfullscreen></iframe>
            <iframe src="/embed/space-race-mobile" sandbox="allow-scripts"></iframe>
            <iframe></iframe>
          </body>
        </html>"#;

    #[test]
    fn test_parse_full_page() {
        let record = parse_game_page(
            GAME_PAGE,
            "https://www.onlinegames.io/space-race/",
            "Space Race",
            None,
            &base(),
        );

        assert_eq!(record.title, "Space Race");
        assert_eq!(
            record.description,
            "Race through space dodging asteroids in this fast arcade game."
        );
        assert_eq!(record.category, "Arcade");
        assert_eq!(record.rating, "4.5/5");
        assert_eq!(record.play_count, "12.3k plays");
        assert_eq!(record.game_type, Some(GameType::Unity));
        assert_eq!(
            record.thumbnail.as_deref(),
            Some("https://cdn.onlinegames.io/images/space-race.jpg")
        );
        assert_eq!(record.thumbnail_alt, "");
    }

    #[test]
    fn test_iframes_keep_document_order_and_attributes() {
        let record = parse_game_page(GAME_PAGE, "u", "t", None, &base());

        assert_eq!(record.iframes.len(), 2);
        let first = &record.iframes[0];
        assert_eq!(first.src, "https://games.example.com/unity/space-race/index.html");
        assert_eq!(first.width, "800");
        assert_eq!(first.height, "600");
        assert_eq!(first.frameborder, "0");
        assert_eq!(first.allowfullscreen, "");
        assert_eq!(first.sandbox, "");

        let second = &record.iframes[1];
        assert_eq!(second.src, "https://www.onlinegames.io/embed/space-race-mobile");
        assert_eq!(second.sandbox, "allow-scripts");
    }

    #[test]
    fn test_tags_deduplicated_and_capped() {
        let record = parse_game_page(GAME_PAGE, "u", "t", None, &base());

        assert_eq!(record.tags.len(), MAX_TAGS);
        assert_eq!(record.tags, vec!["space", "racing", "arcade", "asteroids", "Fun"]);
    }

    #[test]
    fn test_description_skips_short_candidates() {
        let html = r#"
            <meta name="description" content="Too short">
            <div class="description">Also short</div>
            <p>A proper paragraph describing the game in some detail.</p>"#;
        let record = parse_game_page(html, "u", "t", None, &base());
        assert_eq!(record.description, "A proper paragraph describing the game in some detail.");
    }

    #[test]
    fn test_description_truncated() {
        let html = format!("<div class=\"game-description\">{}</div>", "word ".repeat(200));
        let record = parse_game_page(&html, "u", "t", None, &base());
        assert_eq!(record.description.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn test_empty_page_leaves_fields_empty() {
        let record = parse_game_page("<html></html>", "u", "t", None, &base());
        assert!(record.iframes.is_empty());
        assert!(record.game_type.is_none());
        assert!(record.description.is_empty());
        assert!(record.tags.is_empty());
        assert!(record.category.is_empty());
        assert!(record.thumbnail.is_none());
    }

    #[test]
    fn test_thumbnail_alt_from_img() {
        let html = r#"
            <img src="/static/logo.png" alt="logo">
            <div class="game-thumbnail"><img src="/media/thumbs/drift.png" alt="Drift Hunters"></div>"#;
        let record = parse_game_page(html, "u", "t", None, &base());
        assert_eq!(
            record.thumbnail.as_deref(),
            Some("https://www.onlinegames.io/media/thumbs/drift.png")
        );
        assert_eq!(record.thumbnail_alt, "Drift Hunters");
    }

    #[test]
    fn test_thumbnail_falls_back_to_landing_image() {
        let record = parse_game_page(
            "<p>nothing</p>",
            "u",
            "t",
            Some("https://cdn.onlinegames.io/images/x.jpg"),
            &base(),
        );
        assert_eq!(
            record.thumbnail.as_deref(),
            Some("https://cdn.onlinegames.io/images/x.jpg")
        );
    }

    #[test]
    fn test_game_type_web_default() {
        let html = r#"<iframe src="https://embed.example.com/g/123"></iframe>"#;
        let record = parse_game_page(html, "u", "t", None, &base());
        assert_eq!(record.game_type, Some(GameType::Web));
    }

    struct MapFetcher(HashMap<String, String>);

    #[async_trait]
    impl Fetch for MapFetcher {
        async fn fetch(&self, url: &str) -> Option<String> {
            self.0.get(url).cloned()
        }
    }

    #[tokio::test]
    async fn test_analyze_records_iframe_sources() {
        let url = "https://www.onlinegames.io/space-race/";
        let fetcher = MapFetcher(HashMap::from([(url.to_string(), GAME_PAGE.to_string())]));
        let analyzer = PageAnalyzer::new(&fetcher, base());
        let mut ctx = ScrapeContext::new("https://www.onlinegames.io");

        let record = analyzer.analyze(&mut ctx, url, "Space Race", None).await.unwrap();

        assert_eq!(record.iframes.len(), 2);
        assert_eq!(ctx.iframe_sources().len(), 2);
        assert!(ctx
            .iframe_sources()
            .contains("https://games.example.com/unity/space-race/index.html"));
        assert!(ctx
            .iframe_sources()
            .contains("https://www.onlinegames.io/embed/space-race-mobile"));
    }

    #[tokio::test]
    async fn test_analyze_fetch_failure_is_none() {
        let fetcher = MapFetcher(HashMap::new());
        let analyzer = PageAnalyzer::new(&fetcher, base());
        let mut ctx = ScrapeContext::new("https://www.onlinegames.io");

        assert!(analyzer
            .analyze(&mut ctx, "https://www.onlinegames.io/gone/", "Gone", None)
            .await
            .is_none());
        assert!(ctx.iframe_sources().is_empty());
    }
}
