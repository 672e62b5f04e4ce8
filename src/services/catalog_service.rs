use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbErr, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::dto::{GameDetails, GameInput};
use crate::entities::{
    developer, game, game_developer, game_genre, game_platform, genre, platform, user_game,
};
use crate::errors::{AppError, EntityKind, ValidationError};
use crate::store::Store;

/// Catalog maintenance: games and the genres, platforms and developers they reference.
pub struct CatalogService;

/// Generates create/list/delete for a reference table and its game join table.
macro_rules! reference_operations {
    ($(
        $entity:ident via $join:ident.$member:ident as $kind:expr => {
            create: $create:ident,
            list: $list:ident,
            delete: $delete:ident $(,)?
        }
    );+ $(;)?) => {
        $(
        impl CatalogService {
            #[doc = concat!("Create a ", stringify!($entity), " with a unique, non-empty name.")]
            ///
            /// The name is trimmed; uniqueness is an exact, case-sensitive match.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::EmptyName`] or [`ValidationError::Duplicate`].
            pub async fn $create(store: &Store, name: &str) -> Result<$entity::Model, AppError> {
                let kind = $kind;
                let name = name.trim().to_string();
                store
                    .run_in_transaction::<$entity::Model, _>(move |txn| {
                        Box::pin(async move {
                            if name.is_empty() {
                                return Err(ValidationError::EmptyName(kind).into());
                            }
                            let existing = $entity::Entity::find()
                                .filter($entity::Column::Name.eq(name.as_str()))
                                .one(txn)
                                .await?;
                            if existing.is_some() {
                                return Err(ValidationError::Duplicate { kind, name }.into());
                            }
                            let model = $entity::ActiveModel {
                                id: Set(Uuid::new_v4()),
                                name: Set(name),
                                created_at: Set(Utc::now().fixed_offset()),
                            }
                            .insert(txn)
                            .await?;
                            tracing::info!(%kind, id = %model.id, name = %model.name, "Catalog reference created");
                            Ok(model)
                        })
                    })
                    .await
            }

            #[doc = concat!("All ", stringify!($entity), " entries ordered by name.")]
            ///
            /// # Errors
            ///
            /// Returns [`AppError::Store`] if the query fails.
            pub async fn $list(store: &Store) -> Result<Vec<$entity::Model>, AppError> {
                store
                    .run_read_only::<Vec<$entity::Model>, _>(|db| {
                        Box::pin(async move {
                            Ok($entity::Entity::find()
                                .order_by_asc($entity::Column::Name)
                                .all(db)
                                .await?)
                        })
                    })
                    .await
            }

            #[doc = concat!("Delete a ", stringify!($entity), " that no game references any more.")]
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::NotFound`], or [`ValidationError::InUse`] while a
            /// game still lists it (removing it would leave that game without a member).
            pub async fn $delete(store: &Store, id: Uuid) -> Result<(), AppError> {
                let kind = $kind;
                store
                    .run_in_transaction::<(), _>(move |txn| {
                        Box::pin(async move {
                            if $entity::Entity::find_by_id(id).one(txn).await?.is_none() {
                                return Err(ValidationError::not_found(kind, id).into());
                            }
                            let games = $join::Entity::find()
                                .filter($join::Column::$member.eq(id))
                                .count(txn)
                                .await?;
                            if games > 0 {
                                return Err(ValidationError::InUse { kind, id, games }.into());
                            }
                            $entity::Entity::delete_by_id(id).exec(txn).await?;
                            tracing::info!(%kind, %id, "Catalog reference deleted");
                            Ok(())
                        })
                    })
                    .await
            }
        }
        )+
    };
}

reference_operations! {
    genre via game_genre.GenreId as EntityKind::Genre => {
        create: create_genre,
        list: list_genres,
        delete: delete_genre,
    };
    platform via game_platform.PlatformId as EntityKind::Platform => {
        create: create_platform,
        list: list_platforms,
        delete: delete_platform,
    };
    developer via game_developer.DeveloperId as EntityKind::Developer => {
        create: create_developer,
        list: list_developers,
        delete: delete_developer,
    };
}

impl CatalogService {
    /// Create a game together with its genre, platform and developer associations.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name is blank, an association list is empty,
    /// or an id does not resolve; nothing is persisted in that case.
    pub async fn create_game(store: &Store, input: GameInput) -> Result<GameDetails, AppError> {
        store
            .run_in_transaction(move |txn| Box::pin(insert_game(txn, input)))
            .await
    }

    /// Replace a game's fields and its entire association sets with `input`.
    ///
    /// Members missing from `input` are dropped, so callers that want to keep the current
    /// associations must resupply them (see [`GameDetails::to_input`]). Calling this twice
    /// with the same input leaves the same state.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`] for an unknown game, otherwise the same
    /// validation errors as [`CatalogService::create_game`].
    pub async fn update_game(
        store: &Store,
        game_id: Uuid,
        input: GameInput,
    ) -> Result<GameDetails, AppError> {
        store
            .run_in_transaction(move |txn| Box::pin(replace_game(txn, game_id, input)))
            .await
    }

    /// Delete a game and its association rows.
    ///
    /// A game that is still in any user's library is kept and the call fails; remove it
    /// from those libraries first.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`] or [`ValidationError::GameInLibraries`].
    pub async fn delete_game(store: &Store, game_id: Uuid) -> Result<(), AppError> {
        store
            .run_in_transaction(move |txn| Box::pin(remove_game(txn, game_id)))
            .await
    }

    /// Load one game with its associations.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`] if the game does not exist.
    pub async fn get_game(store: &Store, game_id: Uuid) -> Result<GameDetails, AppError> {
        store
            .run_read_only(move |db| {
                Box::pin(async move {
                    let game = find_game(db, game_id).await?;
                    Ok(load_details(db, game).await?)
                })
            })
            .await
    }

    /// All games ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the query fails.
    pub async fn list_games(store: &Store) -> Result<Vec<game::Model>, AppError> {
        store
            .run_read_only(|db| {
                Box::pin(async move {
                    Ok(game::Entity::find()
                        .order_by_asc(game::Column::Name)
                        .order_by_asc(game::Column::Id)
                        .all(db)
                        .await?)
                })
            })
            .await
    }

    /// Games whose name matches `name` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the query fails.
    pub async fn find_games_by_name(
        store: &Store,
        name: &str,
    ) -> Result<Vec<game::Model>, AppError> {
        let name = name.to_string();
        store
            .run_read_only(move |db| {
                Box::pin(async move {
                    Ok(game::Entity::find()
                        .filter(game::Column::Name.eq(name))
                        .order_by_asc(game::Column::Id)
                        .all(db)
                        .await?)
                })
            })
            .await
    }
}

/// A `GameInput` whose name and associations have been checked against the store.
struct ValidatedGame {
    name: String,
    release_date: Option<NaiveDate>,
    rating: Option<f32>,
    genres: Vec<genre::Model>,
    platforms: Vec<platform::Model>,
    developers: Vec<developer::Model>,
}

impl ValidatedGame {
    fn into_details(self, game: game::Model) -> GameDetails {
        GameDetails {
            game,
            genres: self.genres,
            platforms: self.platforms,
            developers: self.developers,
        }
    }
}

async fn insert_game(txn: &DatabaseTransaction, input: GameInput) -> Result<GameDetails, AppError> {
    let validated = validate_input(txn, input).await?;
    let now = Utc::now().fixed_offset();

    let game = game::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(validated.name.clone()),
        release_date: Set(validated.release_date),
        rating: Set(validated.rating),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;

    replace_associations(txn, game.id, &validated, now).await?;

    tracing::info!(
        game_id = %game.id,
        name = %game.name,
        genres = validated.genres.len(),
        platforms = validated.platforms.len(),
        developers = validated.developers.len(),
        "Game created"
    );
    Ok(validated.into_details(game))
}

async fn replace_game(
    txn: &DatabaseTransaction,
    game_id: Uuid,
    input: GameInput,
) -> Result<GameDetails, AppError> {
    let existing = find_game(txn, game_id).await?;
    let validated = validate_input(txn, input).await?;
    let now = Utc::now().fixed_offset();

    let mut active: game::ActiveModel = existing.into();
    active.name = Set(validated.name.clone());
    active.release_date = Set(validated.release_date);
    active.rating = Set(validated.rating);
    active.updated_at = Set(now);
    let game = active.update(txn).await?;

    replace_associations(txn, game.id, &validated, now).await?;

    tracing::info!(game_id = %game.id, name = %game.name, "Game updated");
    Ok(validated.into_details(game))
}

async fn remove_game(txn: &DatabaseTransaction, game_id: Uuid) -> Result<(), AppError> {
    find_game(txn, game_id).await?;

    let owners = user_game::Entity::find()
        .filter(user_game::Column::GameId.eq(game_id))
        .count(txn)
        .await?;
    if owners > 0 {
        return Err(ValidationError::GameInLibraries { game_id, owners }.into());
    }

    clear_associations(txn, game_id).await?;
    game::Entity::delete_by_id(game_id).exec(txn).await?;

    tracing::info!(%game_id, "Game deleted");
    Ok(())
}

async fn find_game<C: ConnectionTrait>(conn: &C, game_id: Uuid) -> Result<game::Model, AppError> {
    game::Entity::find_by_id(game_id)
        .one(conn)
        .await?
        .ok_or_else(|| ValidationError::not_found(EntityKind::Game, game_id).into())
}

async fn load_details<C: ConnectionTrait>(conn: &C, game: game::Model) -> Result<GameDetails, DbErr> {
    let genres = game
        .find_related(genre::Entity)
        .order_by_asc(genre::Column::Name)
        .all(conn)
        .await?;
    let platforms = game
        .find_related(platform::Entity)
        .order_by_asc(platform::Column::Name)
        .all(conn)
        .await?;
    let developers = game
        .find_related(developer::Entity)
        .order_by_asc(developer::Column::Name)
        .all(conn)
        .await?;

    Ok(GameDetails {
        game,
        genres,
        platforms,
        developers,
    })
}

/// Check the name, then that every list is non-empty, then that every id resolves.
async fn validate_input(
    txn: &DatabaseTransaction,
    input: GameInput,
) -> Result<ValidatedGame, AppError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::EmptyName(EntityKind::Game).into());
    }

    let genre_ids = distinct_ids(EntityKind::Genre, &input.genre_ids)?;
    let platform_ids = distinct_ids(EntityKind::Platform, &input.platform_ids)?;
    let developer_ids = distinct_ids(EntityKind::Developer, &input.developer_ids)?;

    let genres = genre::Entity::find()
        .filter(genre::Column::Id.is_in(genre_ids.iter().copied()))
        .order_by_asc(genre::Column::Name)
        .all(txn)
        .await?;
    ensure_resolved(EntityKind::Genre, &genre_ids, genres.iter().map(|g| g.id))?;

    let platforms = platform::Entity::find()
        .filter(platform::Column::Id.is_in(platform_ids.iter().copied()))
        .order_by_asc(platform::Column::Name)
        .all(txn)
        .await?;
    ensure_resolved(EntityKind::Platform, &platform_ids, platforms.iter().map(|p| p.id))?;

    let developers = developer::Entity::find()
        .filter(developer::Column::Id.is_in(developer_ids.iter().copied()))
        .order_by_asc(developer::Column::Name)
        .all(txn)
        .await?;
    ensure_resolved(EntityKind::Developer, &developer_ids, developers.iter().map(|d| d.id))?;

    Ok(ValidatedGame {
        name,
        release_date: input.release_date,
        rating: input.rating,
        genres,
        platforms,
        developers,
    })
}

fn distinct_ids(kind: EntityKind, ids: &[Uuid]) -> Result<BTreeSet<Uuid>, ValidationError> {
    let set: BTreeSet<Uuid> = ids.iter().copied().collect();
    if set.is_empty() {
        return Err(ValidationError::MissingAssociation(kind));
    }
    Ok(set)
}

fn ensure_resolved(
    kind: EntityKind,
    requested: &BTreeSet<Uuid>,
    found: impl Iterator<Item = Uuid>,
) -> Result<(), ValidationError> {
    let found: BTreeSet<Uuid> = found.collect();
    requested
        .difference(&found)
        .next()
        .map_or(Ok(()), |&id| Err(ValidationError::UnknownReference { kind, id }))
}

async fn clear_associations(txn: &DatabaseTransaction, game_id: Uuid) -> Result<(), DbErr> {
    game_genre::Entity::delete_many()
        .filter(game_genre::Column::GameId.eq(game_id))
        .exec(txn)
        .await?;
    game_platform::Entity::delete_many()
        .filter(game_platform::Column::GameId.eq(game_id))
        .exec(txn)
        .await?;
    game_developer::Entity::delete_many()
        .filter(game_developer::Column::GameId.eq(game_id))
        .exec(txn)
        .await?;
    Ok(())
}

/// Full replace: drop every join row of the game, then insert the validated sets.
async fn replace_associations(
    txn: &DatabaseTransaction,
    game_id: Uuid,
    validated: &ValidatedGame,
    now: DateTime<FixedOffset>,
) -> Result<(), DbErr> {
    clear_associations(txn, game_id).await?;

    game_genre::Entity::insert_many(validated.genres.iter().map(|g| game_genre::ActiveModel {
        game_id: Set(game_id),
        genre_id: Set(g.id),
        created_at: Set(now),
    }))
    .exec_without_returning(txn)
    .await?;

    game_platform::Entity::insert_many(validated.platforms.iter().map(|p| {
        game_platform::ActiveModel {
            game_id: Set(game_id),
            platform_id: Set(p.id),
            created_at: Set(now),
        }
    }))
    .exec_without_returning(txn)
    .await?;

    game_developer::Entity::insert_many(validated.developers.iter().map(|d| {
        game_developer::ActiveModel {
            game_id: Set(game_id),
            developer_id: Set(d.id),
            created_at: Set(now),
        }
    }))
    .exec_without_returning(txn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_ids_collapses_repeats() {
        let id = Uuid::new_v4();
        let set = distinct_ids(EntityKind::Genre, &[id, id]).unwrap_or_default();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_distinct_ids_rejects_empty() {
        assert_eq!(
            distinct_ids(EntityKind::Developer, &[]),
            Err(ValidationError::MissingAssociation(EntityKind::Developer))
        );
    }

    #[test]
    fn test_ensure_resolved_reports_missing_id() {
        let known = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let requested: BTreeSet<Uuid> = [known, missing].into_iter().collect();

        assert_eq!(
            ensure_resolved(EntityKind::Platform, &requested, [known].into_iter()),
            Err(ValidationError::UnknownReference {
                kind: EntityKind::Platform,
                id: missing,
            })
        );
        assert_eq!(
            ensure_resolved(EntityKind::Platform, &requested, [missing, known].into_iter()),
            Ok(())
        );
    }
}
