//! Game detail page rendering.

use askama::Template;

use super::seo;
use super::SiteConfig;
use crate::models::Game;

/// Fallback social preview image, relative to the site root.
const DEFAULT_OG_IMAGE: &str = "/images/game-og.jpg";

/// A related game card.
pub struct RelatedCard<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub thumbnail_url: Option<&'a str>,
}

impl<'a> From<&'a Game> for RelatedCard<'a> {
    fn from(game: &'a Game) -> Self {
        Self {
            slug: &game.slug,
            title: &game.title,
            description: &game.description,
            thumbnail_url: game.thumbnail_url.as_deref().filter(|u| !u.is_empty()),
        }
    }
}

#[derive(Template)]
#[template(path = "game.html")]
pub struct GamePageTemplate<'a> {
    pub site_name: &'a str,
    pub page_title: String,
    pub social_title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub og_image: String,
    pub canonical_url: String,
    pub structured_data: String,
    pub title: &'a str,
    pub description: &'a str,
    pub long_description: &'a str,
    pub iframe_url: Option<&'a str>,
    pub category_name: &'a str,
    pub rating: String,
    pub total_plays: String,
    pub release_date: String,
    pub tags: &'a [String],
    pub features: &'a [String],
    pub controls: Vec<(&'a str, &'a str)>,
    pub related: Vec<RelatedCard<'a>>,
}

/// `12345` as `12,345`.
fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

/// JSON for a `<script>` body; `</` cannot close the tag early.
fn script_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_default()
        .replace("</", "<\\/")
}

/// Render the detail page for `game`.
pub fn render_game_page(
    game: &Game,
    tags: &[String],
    related: &[Game],
    site: &SiteConfig,
) -> Result<String, askama::Error> {
    let og_image = game
        .thumbnail_url
        .clone()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| format!("{}{}", site.site_url, DEFAULT_OG_IMAGE));
    let social_title = format!("{} | {}", game.title, site.site_name);
    let iframe_url = game
        .iframe_url
        .as_deref()
        .filter(|u| !u.is_empty())
        .or(Some(game.game_url.as_str()).filter(|u| !u.is_empty()));

    let template = GamePageTemplate {
        site_name: &site.site_name,
        page_title: format!("Play {} Online Free - {}", game.title, site.site_name),
        social_title,
        meta_description: seo::meta_description(&game.title, &site.site_name, &game.description),
        meta_keywords: seo::meta_keywords(&site.site_name, &game.category_name, tags),
        structured_data: script_json(&seo::structured_data(game, &site.site_url, &og_image)),
        og_image,
        canonical_url: seo::game_url(&site.site_url, &game.slug),
        title: &game.title,
        description: &game.description,
        long_description: game
            .long_description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&game.description),
        iframe_url,
        category_name: &game.category_name,
        rating: format!("{:.1}", game.rating),
        total_plays: group_thousands(game.total_plays),
        release_date: game
            .release_date
            .map(|d| d.format("%B %d, %Y").to_string())
            .unwrap_or_else(|| "Coming Soon".to_string()),
        tags,
        features: &game.features,
        controls: game
            .controls
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect(),
        related: related.iter().map(RelatedCard::from).collect(),
    };

    template.render()
}
