//! Catalog fields derived from scraped data.
//!
//! Scraped pages rarely carry tags, features or control hints, so the
//! importer fills them in from keywords in the title and description.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Controls, GameRecord, GameType, MAX_TAGS};

/// Upper bound on generated features.
pub const MAX_FEATURES: usize = 6;

const TITLE_TAGS: &[(&str, &[&str])] = &[
    ("papa", &["Cooking", "Restaurant", "Time Management"]),
    ("parkour", &["Action", "Platform", "Adventure"]),
    ("clicker", &["Clicker", "Idle", "Casual"]),
    ("brainrot", &["Fun", "Meme", "Casual"]),
    ("drift", &["Racing", "Cars", "Driving"]),
    ("run", &["Running", "Endless", "Platform"]),
    ("merge", &["Puzzle", "Strategy", "Merge"]),
    ("obby", &["Platform", "Adventure", "Roblox"]),
    ("simulator", &["Simulation", "Management", "Strategy"]),
    ("geometry", &["Rhythm", "Platform", "Arcade"]),
    ("traffic", &["Cars", "Management", "Strategy"]),
    ("love", &["Casual", "Fun", "Social"]),
    ("pixel", &["Retro", "Arcade", "Pixel Art"]),
    ("io", &["Multiplayer", "Online", "Competitive"]),
];

const DESCRIPTION_TAGS: &[(&str, &str)] = &[
    ("survival", "Survival"),
    ("puzzle", "Puzzle"),
    ("racing", "Racing"),
    ("cooking", "Cooking"),
    ("adventure", "Adventure"),
    ("action", "Action"),
    ("strategy", "Strategy"),
    ("multiplayer", "Multiplayer"),
    ("3d", "3D"),
    ("retro", "Retro"),
    ("arcade", "Arcade"),
    ("casual", "Casual"),
];

const BASE_FEATURES: &[&str] = &["Free to play", "No download required", "Play in browser"];

/// Control schemes keyed by title keywords; the first group with a match
/// wins.
const CONTROL_SCHEMES: &[(&[&str], &[(&str, &str)])] = &[
    (
        &["clicker", "click"],
        &[("Mouse", "Click to play"), ("Left Click", "Main action")],
    ),
    (
        &["parkour", "run", "jump", "geometry"],
        &[
            ("Arrow Keys", "Move left/right"),
            ("Spacebar", "Jump"),
            ("Mouse", "Navigate menus"),
        ],
    ),
    (
        &["drift", "racing", "car", "traffic"],
        &[
            ("Arrow Keys", "Steer and accelerate"),
            ("WASD", "Alternative controls"),
            ("Spacebar", "Handbrake"),
        ],
    ),
    (
        &["papa", "cooking"],
        &[
            ("Mouse", "Click and drag ingredients"),
            ("Left Click", "Select items"),
            ("Drag & Drop", "Prepare orders"),
        ],
    ),
    (
        &["io"],
        &[
            ("Mouse", "Move and aim"),
            ("Left Click", "Primary action"),
            ("Right Click", "Secondary action"),
            ("WASD", "Alternative movement"),
        ],
    ),
];

const DEFAULT_CONTROLS: &[(&str, &str)] = &[
    ("Mouse", "Click and interact"),
    ("Arrow Keys", "Navigate"),
    ("Spacebar", "Action"),
];

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
static COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*([km])?").unwrap());

/// Push `tag` unless already present.
fn push_unique(tags: &mut Vec<String>, tag: &str) {
    if !tags.iter().any(|t| t == tag) {
        tags.push(tag.to_string());
    }
}

/// Up to five tags from the embed technology and title/description keywords.
pub fn generate_tags(game: &GameRecord) -> Vec<String> {
    let title = game.title.to_lowercase();
    let description = game.description.to_lowercase();
    let mut tags = Vec::new();

    match game.game_type {
        Some(GameType::Flash) => push_unique(&mut tags, "Flash"),
        Some(GameType::Html5) => push_unique(&mut tags, "HTML5"),
        Some(GameType::Unity) => push_unique(&mut tags, "Unity"),
        Some(GameType::Web) | None => {}
    }

    for (keyword, keyword_tags) in TITLE_TAGS {
        if title.contains(keyword) {
            keyword_tags.iter().for_each(|t| push_unique(&mut tags, t));
        }
    }
    for (keyword, tag) in DESCRIPTION_TAGS {
        if description.contains(keyword) {
            push_unique(&mut tags, tag);
        }
    }

    tags.truncate(MAX_TAGS);
    tags
}

/// Feature bullet points for a game's detail page.
pub fn generate_features(game: &GameRecord) -> Vec<String> {
    let title = game.title.to_lowercase();
    let mut features: Vec<String> = BASE_FEATURES.iter().map(|f| f.to_string()).collect();

    match game.game_type {
        Some(GameType::Html5) => {
            features.push("HTML5 compatible".to_string());
            features.push("Mobile friendly".to_string());
        }
        Some(GameType::Flash) => features.push("Classic Flash game".to_string()),
        Some(GameType::Unity) => {
            features.push("Unity powered".to_string());
            features.push("3D graphics".to_string());
        }
        Some(GameType::Web) | None => {}
    }

    if game.description.to_lowercase().contains("multiplayer") {
        features.push("Multiplayer support".to_string());
    }
    if ["clicker", "idle"].iter().any(|w| title.contains(w)) {
        features.push("Idle gameplay".to_string());
    }
    if ["parkour", "run", "jump"].iter().any(|w| title.contains(w)) {
        features.push("Fast-paced action".to_string());
    }

    features.truncate(MAX_FEATURES);
    features
}

/// Control hints chosen from title keywords.
pub fn generate_controls(game: &GameRecord) -> Controls {
    let title = game.title.to_lowercase();
    let scheme = CONTROL_SCHEMES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| title.contains(k)))
        .map(|(_, scheme)| *scheme)
        .unwrap_or(DEFAULT_CONTROLS);

    scheme
        .iter()
        .map(|(key, action)| (key.to_string(), action.to_string()))
        .collect()
}

/// Star rating from scraped text such as `"4.5/5"`; 0 when absent.
pub fn parse_rating(text: &str) -> f64 {
    NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|r| r.clamp(0.0, 5.0))
        .unwrap_or(0.0)
}

/// Play count from scraped text such as `"12.5K plays"`; 0 when absent.
pub fn parse_play_count(text: &str) -> i64 {
    let Some(caps) = COUNT.captures(text) else {
        return 0;
    };
    let Ok(value) = caps[1].replace(',', "").parse::<f64>() else {
        return 0;
    };
    let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(s) if s == "k" => 1_000.0,
        Some(s) if s == "m" => 1_000_000.0,
        _ => 1.0,
    };
    (value * multiplier).round() as i64
}
