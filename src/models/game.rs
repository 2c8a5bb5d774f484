//! Scrape-side records produced by the portal scraper.
//!
//! These are the shapes persisted to `games_data.json`. They are plain data;
//! extraction lives in `crate::scrapers`.

use serde::{Deserialize, Serialize};

/// Maximum number of characters kept from a page description.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Maximum number of tags kept per game.
pub const MAX_TAGS: usize = 5;

/// Runtime a game's embed appears to be built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    Unity,
    Flash,
    #[serde(rename = "HTML5")]
    Html5,
    Web,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unity => "Unity",
            Self::Flash => "Flash",
            Self::Html5 => "HTML5",
            Self::Web => "Web",
        }
    }

    /// Classify an embed address by case-insensitive substring.
    pub fn from_embed_src(src: &str) -> Self {
        let lower = src.to_lowercase();
        if lower.contains("unity") {
            Self::Unity
        } else if lower.contains("flash") {
            Self::Flash
        } else if lower.contains("html5") {
            Self::Html5
        } else {
            Self::Web
        }
    }
}

/// A candidate game link discovered on the landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLink {
    pub title: String,
    /// Absolute URL of the game page.
    pub url: String,
    /// The href exactly as written in the markup.
    pub relative_path: String,
    pub thumbnail: Option<String>,
}

/// One `<iframe>` found on a game page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IframeRecord {
    pub src: String,
    #[serde(default)]
    pub width: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub frameborder: String,
    #[serde(default)]
    pub allowfullscreen: String,
    #[serde(default)]
    pub sandbox: String,
}

/// Everything extracted from a single game page.
///
/// `url` is the identity key for deduplication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub iframes: Vec<IframeRecord>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub play_count: String,
    #[serde(default, with = "empty_as_none")]
    pub game_type: Option<GameType>,
    #[serde(default, with = "empty_as_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub thumbnail_alt: String,
}

impl GameRecord {
    /// First embed address, if the page had any iframe.
    pub fn primary_embed(&self) -> Option<&str> {
        self.iframes.first().map(|f| f.src.as_str())
    }
}

/// Optional string-valued fields that the document stores as `""` when
/// absent. `null` is accepted on read as well.
mod empty_as_none {
    use serde::de::IntoDeserializer;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.is_empty() => T::deserialize(s.into_deserializer()).map(Some),
            _ => Ok(None),
        }
    }
}

/// The persisted scrape document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub website: String,
    pub extraction_timestamp: String,
    pub total_games: usize,
    pub games: Vec<GameRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_type_from_embed_src() {
        assert_eq!(
            GameType::from_embed_src("https://cdn.x.io/UnityBuild/index.html"),
            GameType::Unity
        );
        assert_eq!(GameType::from_embed_src("https://x.io/flash/g.swf"), GameType::Flash);
        assert_eq!(GameType::from_embed_src("https://x.io/HTML5/g"), GameType::Html5);
        assert_eq!(GameType::from_embed_src("https://x.io/embed/g"), GameType::Web);
    }

    #[test]
    fn test_game_type_serializes_display_names() {
        let json = serde_json::to_string(&GameType::Html5).unwrap();
        assert_eq!(json, "\"HTML5\"");
        let parsed: GameType = serde_json::from_str("\"Unity\"").unwrap();
        assert_eq!(parsed, GameType::Unity);
    }

    #[test]
    fn test_game_record_tolerates_sparse_json() {
        let record: GameRecord =
            serde_json::from_str(r#"{"title": "Drift", "url": "https://x.io/drift"}"#).unwrap();
        assert!(record.iframes.is_empty());
        assert!(record.game_type.is_none());
        assert_eq!(record.primary_embed(), None);
    }

    #[test]
    fn test_empty_game_type_and_thumbnail_read_as_none() {
        let record: GameRecord = serde_json::from_str(
            r#"{"title": "No Embed", "url": "https://x.io/n", "iframes": [],
                "game_type": "", "thumbnail": "", "thumbnail_alt": ""}"#,
        )
        .unwrap();
        assert!(record.game_type.is_none());
        assert!(record.thumbnail.is_none());

        let nulls: GameRecord = serde_json::from_str(
            r#"{"title": "N", "url": "https://x.io/n", "game_type": null, "thumbnail": null}"#,
        )
        .unwrap();
        assert!(nulls.game_type.is_none());
        assert!(nulls.thumbnail.is_none());
    }

    #[test]
    fn test_absent_values_written_as_empty_strings() {
        let record = GameRecord {
            title: "N".to_string(),
            url: "https://x.io/n".to_string(),
            ..Default::default()
        };
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["game_type"], "");
        assert_eq!(json["thumbnail"], "");

        let typed = GameRecord {
            game_type: Some(GameType::Html5),
            thumbnail: Some("https://x.io/t.png".to_string()),
            ..record
        };
        let back: GameRecord =
            serde_json::from_str(&serde_json::to_string(&typed).unwrap()).unwrap();
        assert_eq!(back.game_type, Some(GameType::Html5));
        assert_eq!(back.thumbnail.as_deref(), Some("https://x.io/t.png"));
    }
}
