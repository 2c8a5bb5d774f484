//! Sitemaps, robots.txt and per-page metadata.

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::models::Game;
use crate::utils::truncate_with_ellipsis;

/// Search snippets are cut past this many characters.
const META_DESCRIPTION_LIMIT: usize = 160;
const META_DESCRIPTION_KEEP: usize = 157;

/// Public URL of a generated game page.
pub fn game_url(site_url: &str, slug: &str) -> String {
    format!("{}/games/{}.html", site_url, slug)
}

pub fn meta_description(title: &str, site_name: &str, description: &str) -> String {
    truncate_with_ellipsis(
        &format!("Play {} free online at {}. {}", title, site_name, description),
        META_DESCRIPTION_LIMIT,
        META_DESCRIPTION_KEEP,
    )
}

pub fn meta_keywords(site_name: &str, category: &str, tags: &[String]) -> String {
    format!(
        "free online game, browser game, {}, {}, {}",
        site_name,
        category,
        tags.join(", ")
    )
}

/// schema.org `Game` record embedded as JSON-LD.
pub fn structured_data(game: &Game, site_url: &str, image: &str) -> Value {
    let mut data = json!({
        "@context": "https://schema.org",
        "@type": "Game",
        "name": game.title,
        "description": game.description,
        "url": game_url(site_url, &game.slug),
        "image": image,
        "genre": game.category_name,
        "gamePlatform": "Web Browser",
        "applicationCategory": "Game",
        "operatingSystem": "Any",
        "isAccessibleForFree": true,
        "offers": {
            "@type": "Offer",
            "price": 0,
            "priceCurrency": "USD",
        },
    });

    if game.rating > 0.0 {
        data["aggregateRating"] = json!({
            "@type": "AggregateRating",
            "ratingValue": game.rating,
            "ratingCount": game.total_plays.max(1),
            "bestRating": 5,
            "worstRating": 1,
        });
    }

    data
}

/// Plain-text sitemap: landing pages, then one line per game.
pub fn sitemap_txt(site_url: &str, slugs: &[String]) -> String {
    let mut out = format!("{}/\n{}/games.html\n", site_url, site_url);
    for slug in slugs {
        out.push_str(&game_url(site_url, slug));
        out.push('\n');
    }
    out
}

fn sitemap_entry(out: &mut String, loc: &str, lastmod: &str, changefreq: &str, priority: &str) {
    out.push_str("  <url>\n");
    out.push_str(&format!("    <loc>{}</loc>\n", loc));
    out.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
    out.push_str(&format!("    <changefreq>{}</changefreq>\n", changefreq));
    out.push_str(&format!("    <priority>{}</priority>\n", priority));
    out.push_str("  </url>\n");
}

pub fn sitemap_xml(site_url: &str, slugs: &[String], generated: NaiveDate) -> String {
    let lastmod = generated.format("%Y-%m-%d").to_string();
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    sitemap_entry(&mut out, &format!("{}/", site_url), &lastmod, "daily", "1.0");
    sitemap_entry(
        &mut out,
        &format!("{}/games.html", site_url),
        &lastmod,
        "daily",
        "0.9",
    );
    for slug in slugs {
        sitemap_entry(&mut out, &game_url(site_url, slug), &lastmod, "weekly", "0.8");
    }

    out.push_str("</urlset>\n");
    out
}

pub fn robots_txt(site_url: &str) -> String {
    format!(
        "User-agent: *\n\
         Allow: /\n\
         \n\
         Sitemap: {site}/sitemap.xml\n\
         Sitemap: {site}/sitemap.txt\n\
         \n\
         Allow: /games/\n\
         Allow: /games.html\n\
         \n\
         Disallow: /assets/js/\n\
         Disallow: /assets/css/\n\
         Disallow: /*.json$\n\
         \n\
         User-agent: Googlebot\n\
         Allow: /\n\
         \n\
         User-agent: Bingbot\n\
         Allow: /\n\
         \n\
         User-agent: Slurp\n\
         Allow: /\n",
        site = site_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Controls;
    use chrono::Utc;

    const SITE: &str = "https://btwgame.com";

    fn game(rating: f64, plays: i64) -> Game {
        Game {
            id: 7,
            title: "Space Race".to_string(),
            slug: "space-race".to_string(),
            description: "Race through space".to_string(),
            long_description: None,
            thumbnail_url: None,
            game_url: "https://embed.io/space".to_string(),
            iframe_url: None,
            category_id: 1,
            category_name: "Racing".to_string(),
            category_slug: "racing".to_string(),
            rating,
            total_plays: plays,
            is_featured: false,
            is_new: true,
            is_active: true,
            tags: Vec::new(),
            features: Vec::new(),
            controls: Controls::new(),
            release_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_meta_description_truncation() {
        let short = meta_description("Space Race", "BTW Games", "Fast.");
        assert_eq!(short, "Play Space Race free online at BTW Games. Fast.");

        let long = meta_description("Space Race", "BTW Games", &"x".repeat(200));
        assert_eq!(long.chars().count(), 160);
        assert!(long.ends_with("..."));
    }

    #[test]
    fn test_structured_data_rating_only_when_rated() {
        let unrated = structured_data(&game(0.0, 10), SITE, "img.jpg");
        assert!(unrated.get("aggregateRating").is_none());
        assert_eq!(unrated["url"], "https://btwgame.com/games/space-race.html");
        assert_eq!(unrated["genre"], "Racing");

        let rated = structured_data(&game(4.5, 0), SITE, "img.jpg");
        assert_eq!(rated["aggregateRating"]["ratingValue"], 4.5);
        assert_eq!(rated["aggregateRating"]["ratingCount"], 1);
    }

    #[test]
    fn test_sitemaps() {
        let slugs = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            sitemap_txt(SITE, &slugs),
            "https://btwgame.com/\nhttps://btwgame.com/games.html\n\
             https://btwgame.com/games/a.html\nhttps://btwgame.com/games/b.html\n"
        );

        let date = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        let xml = sitemap_xml(SITE, &slugs, date);
        assert_eq!(xml.matches("<url>").count(), 4);
        assert_eq!(xml.matches("<lastmod>2025-01-20</lastmod>").count(), 4);
        assert!(xml.contains("<loc>https://btwgame.com/games/b.html</loc>"));
        assert!(xml.ends_with("</urlset>\n"));
    }

    #[test]
    fn test_robots_lists_both_sitemaps() {
        let robots = robots_txt(SITE);
        assert!(robots.contains("Sitemap: https://btwgame.com/sitemap.xml"));
        assert!(robots.contains("Sitemap: https://btwgame.com/sitemap.txt"));
        assert!(robots.contains("Disallow: /*.json$"));
        assert!(robots.contains("User-agent: Slurp"));
    }
}
