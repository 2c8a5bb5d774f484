//! Normalized tag set shown on generated pages.
//!
//! Stored tags come from the importer's keyword tables and vary a lot
//! between games; the site shows a smaller, consistent vocabulary instead.

use crate::models::Game;

/// Most tags shown for one game.
pub const MAX_STANDARD_TAGS: usize = 6;

const PLATFORM_TAGS: &[&str] = &["HTML5", "Unity"];

const GENRES: &[(&str, &[&str])] = &[
    ("Action", &["action", "fight", "combat", "battle", "war", "shoot", "gun", "zombie", "adventure"]),
    ("Strategy", &["strategy", "tower defense", "defense", "build", "manage", "city", "empire"]),
    ("Puzzle", &["puzzle", "brain", "logic", "solve", "match", "tetris", "block"]),
    ("Racing", &["race", "racing", "car", "drive", "speed", "drift", "bike", "motorcycle"]),
    ("Sports", &["sport", "football", "soccer", "basketball", "tennis", "golf", "baseball"]),
    ("Arcade", &["arcade", "classic", "retro", "pixel", "old school"]),
    ("Platform", &["platform", "jump", "run", "climb", "parkour"]),
    ("Simulation", &["simulation", "sim", "life", "city", "farm", "cooking", "restaurant"]),
    ("RPG", &["rpg", "role", "character", "level up", "quest", "adventure"]),
    ("Casual", &["casual", "relaxing", "simple", "easy", "family"]),
    ("Multiplayer", &["multiplayer", "online", "vs", "versus", "pvp", "co-op"]),
    ("Clicker", &["clicker", "click", "idle", "incremental", "tap"]),
    ("Educational", &["educational", "learn", "math", "quiz", "knowledge"]),
    ("Horror", &["horror", "scary", "fear", "nightmare", "ghost", "monster"]),
    ("Rhythm", &["rhythm", "music", "beat", "dance", "sound"]),
    ("Card", &["card", "poker", "blackjack", "solitaire", "deck"]),
];

const TRAITS: &[(&str, &[&str])] = &[
    ("IO Game", &["io"]),
    ("3D", &["3d", "three dimensional"]),
    ("2D", &["2d", "two dimensional", "pixel"]),
];

fn is_genre(tag: &str) -> bool {
    GENRES.iter().any(|(genre, _)| *genre == tag)
}

fn platform_tag(embed_url: &str) -> Option<&'static str> {
    let lower = embed_url.to_lowercase();
    if lower.contains("gamedistribution.com") || lower.contains("html5") {
        Some("HTML5")
    } else if lower.contains("unity") {
        Some("Unity")
    } else if !lower.is_empty() {
        Some("HTML5")
    } else {
        None
    }
}

/// Platform, genre and trait tags for a game, at most six.
///
/// Every result carries one platform tag and at least one genre.
pub fn standardize_game_tags(game: &Game) -> Vec<String> {
    let embed_url = game
        .iframe_url
        .as_deref()
        .filter(|u| !u.is_empty())
        .unwrap_or(&game.game_url);
    let text = format!(
        "{} {} {}",
        game.title.to_lowercase(),
        game.description.to_lowercase(),
        game.category_name.to_lowercase()
    );

    let mut tags: Vec<&'static str> = Vec::new();
    if let Some(platform) = platform_tag(embed_url) {
        tags.push(platform);
    }
    for (tag, keywords) in GENRES.iter().chain(TRAITS) {
        if keywords.iter().any(|k| text.contains(k)) && !tags.contains(tag) {
            tags.push(tag);
        }
    }

    if !tags.iter().any(|t| PLATFORM_TAGS.contains(t)) {
        tags.insert(0, "HTML5");
    }
    if !tags.iter().any(|t| is_genre(t)) {
        tags.push(if text.contains("game") { "Casual" } else { "Action" });
    }

    tags.truncate(MAX_STANDARD_TAGS);
    tags.into_iter().map(String::from).collect()
}
