//! Data models for gamesite.

mod catalog;
mod game;

pub use catalog::{Category, Controls, Game, GamePlay, GameStats, DEFAULT_CATEGORY};
pub use game::{
    ExtractionResult, GameLink, GameRecord, GameType, IframeRecord, MAX_DESCRIPTION_CHARS,
    MAX_TAGS,
};
