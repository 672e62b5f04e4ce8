use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub release_date: Option<Date>,
    pub rating: Option<f32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::game_genre::Entity")]
    GameGenres,
    #[sea_orm(has_many = "super::game_platform::Entity")]
    GamePlatforms,
    #[sea_orm(has_many = "super::game_developer::Entity")]
    GameDevelopers,
    #[sea_orm(has_many = "super::user_game::Entity")]
    UserGames,
}

impl Related<super::game_genre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameGenres.def()
    }
}

impl Related<super::game_platform::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GamePlatforms.def()
    }
}

impl Related<super::game_developer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameDevelopers.def()
    }
}

impl Related<super::user_game::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserGames.def()
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::game_genre::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::game_genre::Relation::Game.def().rev())
    }
}

impl Related<super::platform::Entity> for Entity {
    fn to() -> RelationDef {
        super::game_platform::Relation::Platform.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::game_platform::Relation::Game.def().rev())
    }
}

impl Related<super::developer::Entity> for Entity {
    fn to() -> RelationDef {
        super::game_developer::Relation::Developer.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::game_developer::Relation::Game.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
