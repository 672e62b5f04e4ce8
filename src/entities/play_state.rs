use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How far a user has got with a game in their library.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PlayState {
    /// Owned but never started
    #[default]
    #[sea_orm(string_value = "not_played")]
    NotPlayed,
    /// Currently being played
    #[sea_orm(string_value = "playing")]
    Playing,
    /// Finished
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Started and given up on
    #[sea_orm(string_value = "abandoned")]
    Abandoned,
}

impl fmt::Display for PlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PlayState {
    /// Convert to the stored representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotPlayed => "not_played",
            Self::Playing => "playing",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }
}
