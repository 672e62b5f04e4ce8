use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::entities::{developer, game, genre, platform};

/// Everything needed to create a game or fully replace an existing one.
///
/// The three id lists are the complete association sets; anything not listed is removed
/// on update. Repeated ids count once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameInput {
    pub name: String,
    pub release_date: Option<NaiveDate>,
    pub rating: Option<f32>,
    pub genre_ids: Vec<Uuid>,
    pub platform_ids: Vec<Uuid>,
    pub developer_ids: Vec<Uuid>,
}

impl GameInput {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn released(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    #[must_use]
    pub fn rated(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    #[must_use]
    pub fn genres(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.genre_ids = ids.into_iter().collect();
        self
    }

    #[must_use]
    pub fn platforms(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.platform_ids = ids.into_iter().collect();
        self
    }

    #[must_use]
    pub fn developers(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.developer_ids = ids.into_iter().collect();
        self
    }
}

/// A game together with its full association sets, each ordered by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameDetails {
    pub game: game::Model,
    pub genres: Vec<genre::Model>,
    pub platforms: Vec<platform::Model>,
    pub developers: Vec<developer::Model>,
}

impl GameDetails {
    #[must_use]
    pub fn genre_ids(&self) -> BTreeSet<Uuid> {
        self.genres.iter().map(|g| g.id).collect()
    }

    #[must_use]
    pub fn platform_ids(&self) -> BTreeSet<Uuid> {
        self.platforms.iter().map(|p| p.id).collect()
    }

    #[must_use]
    pub fn developer_ids(&self) -> BTreeSet<Uuid> {
        self.developers.iter().map(|d| d.id).collect()
    }

    /// Ids of every association member, so callers can resupply them unchanged.
    #[must_use]
    pub fn to_input(&self) -> GameInput {
        GameInput {
            name: self.game.name.clone(),
            release_date: self.game.release_date,
            rating: self.game.rating,
            genre_ids: self.genres.iter().map(|g| g.id).collect(),
            platform_ids: self.platforms.iter().map(|p| p.id).collect(),
            developer_ids: self.developers.iter().map(|d| d.id).collect(),
        }
    }
}
