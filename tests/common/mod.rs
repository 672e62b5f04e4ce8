#![allow(dead_code)]

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};
use uuid::Uuid;

use game_library::dto::{GameDetails, GameInput};
use game_library::entities::user;
use game_library::{AppError, CatalogService, Store, ValidationError};

/// Test helper: a migrated in-memory SQLite store.
///
/// The pool is pinned to one connection because every `sqlite::memory:` connection is
/// its own database.
pub async fn setup_store() -> Result<Store, AppError> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await?;
    Migrator::up(&db, None).await?;
    Ok(Store::new(db))
}

/// Test helper: insert a user directly, skipping password hashing.
pub async fn insert_user(store: &Store, username: &str) -> Result<user::Model, AppError> {
    let now = Utc::now().fixed_offset();
    let user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        password_hash: Set("not-a-real-hash".to_string()),
        birth_date: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(store.connection())
    .await?;
    Ok(user)
}

/// Ids of one genre, platform and developer created for a test.
pub struct References {
    pub genre: Uuid,
    pub platform: Uuid,
    pub developer: Uuid,
}

/// Test helper: create the RPG / PC / `StudioX` references.
pub async fn seed_references(store: &Store) -> Result<References, AppError> {
    let genre = CatalogService::create_genre(store, "RPG").await?;
    let platform = CatalogService::create_platform(store, "PC").await?;
    let developer = CatalogService::create_developer(store, "StudioX").await?;
    Ok(References {
        genre: genre.id,
        platform: platform.id,
        developer: developer.id,
    })
}

/// Test helper: a valid game input using one of each reference.
pub fn game_input(name: &str, refs: &References) -> GameInput {
    GameInput::new(name)
        .genres([refs.genre])
        .platforms([refs.platform])
        .developers([refs.developer])
}

/// Test helper: create a game that is expected to pass validation.
pub async fn create_game(
    store: &Store,
    name: &str,
    refs: &References,
) -> Result<GameDetails, AppError> {
    CatalogService::create_game(store, game_input(name, refs)).await
}

/// Test helper: the validation failure behind an operation result, if any.
pub fn validation_error<T>(result: Result<T, AppError>) -> Option<ValidationError> {
    result.err().and_then(|err| err.as_validation().cloned())
}
