use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{PlayState, game, user_game};

/// How a caller names the game to add: by id, or by its exact name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameRef {
    Id(Uuid),
    Name(String),
}

impl From<Uuid> for GameRef {
    fn from(id: Uuid) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for GameRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Whole-record progress update for one library entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressUpdate {
    pub play_state: PlayState,
    pub hours_played: f64,
    pub hours_estimated: bool,
    pub last_played_at: Option<DateTime<FixedOffset>>,
}

/// A library entry joined with the game it refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryEntry {
    pub entry: user_game::Model,
    pub game: game::Model,
}
