use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use crate::dto::{GameRef, LibraryEntry, ProgressUpdate};
use crate::entities::{PlayState, game, user, user_game};
use crate::errors::{AppError, EntityKind, ValidationError};
use crate::store::Store;

/// Per-user ownership and play progress.
pub struct LibraryService;

impl LibraryService {
    /// Add a game to a user's library with default progress (not played, zero hours).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`] for an unknown user or game,
    /// [`ValidationError::AmbiguousGameName`] when a name matches several games, and
    /// [`ValidationError::AlreadyInLibrary`] if the user already owns it.
    pub async fn add_game_to_library(
        store: &Store,
        user_id: Uuid,
        game: GameRef,
    ) -> Result<user_game::Model, AppError> {
        store
            .run_in_transaction(move |txn| Box::pin(insert_entry(txn, user_id, game)))
            .await
    }

    /// Remove a game from a user's library. Removing a game that is not there is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the delete fails.
    pub async fn remove_game_from_library(
        store: &Store,
        user_id: Uuid,
        game_id: Uuid,
    ) -> Result<(), AppError> {
        store
            .run_in_transaction(move |txn| {
                Box::pin(async move {
                    let result = user_game::Entity::delete_many()
                        .filter(user_game::Column::UserId.eq(user_id))
                        .filter(user_game::Column::GameId.eq(game_id))
                        .exec(txn)
                        .await?;
                    if result.rows_affected > 0 {
                        tracing::info!(%user_id, %game_id, "Game removed from library");
                    }
                    Ok(())
                })
            })
            .await
    }

    /// Overwrite play state, hours, the estimated flag and last-played time in one step.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidHours`] for negative or non-finite hours and
    /// [`ValidationError::NotInLibrary`] if the user does not own the game. The stored
    /// record is untouched on error.
    pub async fn update_progress(
        store: &Store,
        user_id: Uuid,
        game_id: Uuid,
        update: ProgressUpdate,
    ) -> Result<user_game::Model, AppError> {
        store
            .run_in_transaction(move |txn| Box::pin(write_progress(txn, user_id, game_id, update)))
            .await
    }

    /// The user's library, ordered by game name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`] if the user does not exist.
    pub async fn get_library(store: &Store, user_id: Uuid) -> Result<Vec<LibraryEntry>, AppError> {
        store
            .run_read_only(move |db| {
                Box::pin(async move {
                    find_user(db, user_id).await?;

                    let rows = user_game::Entity::find()
                        .filter(user_game::Column::UserId.eq(user_id))
                        .find_also_related(game::Entity)
                        .order_by_asc(game::Column::Name)
                        .all(db)
                        .await?;

                    Ok(rows
                        .into_iter()
                        .filter_map(|(entry, game)| game.map(|game| LibraryEntry { entry, game }))
                        .collect())
                })
            })
            .await
    }

    /// The library record for one (user, game) pair, if the user owns the game.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the query fails.
    pub async fn get_entry(
        store: &Store,
        user_id: Uuid,
        game_id: Uuid,
    ) -> Result<Option<user_game::Model>, AppError> {
        store
            .run_read_only(move |db| {
                Box::pin(async move { Ok(find_entry(db, user_id, game_id).await?) })
            })
            .await
    }
}

async fn insert_entry(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    game_ref: GameRef,
) -> Result<user_game::Model, AppError> {
    find_user(txn, user_id).await?;
    let game = resolve_game(txn, game_ref).await?;

    if find_entry(txn, user_id, game.id).await?.is_some() {
        return Err(ValidationError::AlreadyInLibrary { game_id: game.id }.into());
    }

    let entry = insert_default_entry(txn, user_id, game.id).await?;

    tracing::info!(%user_id, game_id = %game.id, game = %game.name, "Game added to library");
    Ok(entry)
}

/// Insert a fresh record. The unique `(user_id, game_id)` index catches a concurrent add
/// that slipped past the lookup, and that is reported like any other duplicate.
async fn insert_default_entry(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    game_id: Uuid,
) -> Result<user_game::Model, AppError> {
    let now = Utc::now().fixed_offset();
    user_game::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        game_id: Set(game_id),
        play_state: Set(PlayState::NotPlayed),
        hours_played: Set(0.0),
        hours_estimated: Set(false),
        last_played_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await
    .map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ValidationError::AlreadyInLibrary { game_id }.into()
        }
        _ => AppError::from(err),
    })
}

async fn write_progress(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    game_id: Uuid,
    update: ProgressUpdate,
) -> Result<user_game::Model, AppError> {
    if !update.hours_played.is_finite() || update.hours_played < 0.0 {
        return Err(ValidationError::InvalidHours(update.hours_played).into());
    }

    let entry = find_entry(txn, user_id, game_id)
        .await?
        .ok_or(ValidationError::NotInLibrary { game_id })?;

    let mut active: user_game::ActiveModel = entry.into();
    active.play_state = Set(update.play_state);
    active.hours_played = Set(update.hours_played);
    active.hours_estimated = Set(update.hours_estimated);
    active.last_played_at = Set(update.last_played_at);
    active.updated_at = Set(Utc::now().fixed_offset());
    let entry = active.update(txn).await?;

    tracing::info!(
        %user_id,
        %game_id,
        state = %entry.play_state,
        hours = entry.hours_played,
        "Library progress updated"
    );
    Ok(entry)
}

async fn find_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| ValidationError::not_found(EntityKind::User, user_id).into())
}

async fn find_entry<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    game_id: Uuid,
) -> Result<Option<user_game::Model>, sea_orm::DbErr> {
    user_game::Entity::find()
        .filter(user_game::Column::UserId.eq(user_id))
        .filter(user_game::Column::GameId.eq(game_id))
        .one(conn)
        .await
}

async fn resolve_game(txn: &DatabaseTransaction, game_ref: GameRef) -> Result<game::Model, AppError> {
    match game_ref {
        GameRef::Id(id) => game::Entity::find_by_id(id)
            .one(txn)
            .await?
            .ok_or_else(|| ValidationError::not_found(EntityKind::Game, id).into()),
        GameRef::Name(name) => {
            let mut matches = game::Entity::find()
                .filter(game::Column::Name.eq(name.as_str()))
                .all(txn)
                .await?;
            match matches.len() {
                0 => Err(ValidationError::not_found(EntityKind::Game, name).into()),
                1 => Ok(matches.remove(0)),
                _ => Err(ValidationError::AmbiguousGameName(name).into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    async fn store_with_user_and_game() -> Result<(Store, Uuid, Uuid), AppError> {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await?;
        Migrator::up(&db, None).await?;

        let now = Utc::now().fixed_offset();
        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set("alice".to_string()),
            password_hash: Set(String::new()),
            birth_date: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;
        let game = game::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Tetris".to_string()),
            release_date: Set(None),
            rating: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;

        Ok((Store::new(db), user.id, game.id))
    }

    #[tokio::test]
    async fn test_unique_index_violation_is_already_in_library() -> Result<(), AppError> {
        let (store, user_id, game_id) = store_with_user_and_game().await?;

        // Skips the lookup, as a concurrent add that lost the race would
        store
            .run_in_transaction(move |txn| Box::pin(insert_default_entry(txn, user_id, game_id)))
            .await?;
        let second = store
            .run_in_transaction(move |txn| Box::pin(insert_default_entry(txn, user_id, game_id)))
            .await;

        assert_eq!(
            second.as_ref().err().and_then(AppError::as_validation),
            Some(&ValidationError::AlreadyInLibrary { game_id })
        );
        Ok(())
    }
}
