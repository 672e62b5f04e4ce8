use sea_orm_migration::prelude::*;

/// Creates the `user_game` table: one ownership and progress record per (user, game) pair.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum UserGame {
    Table,
    Id,
    UserId,
    GameId,
    PlayState,
    HoursPlayed,
    HoursEstimated,
    LastPlayedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Game {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserGame::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserGame::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(UserGame::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserGame::GameId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserGame::PlayState)
                            .string_len(16)
                            .not_null()
                            .default("not_played"),
                    )
                    .col(
                        ColumnDef::new(UserGame::HoursPlayed)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(UserGame::HoursEstimated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UserGame::LastPlayedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserGame::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserGame::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_game_user_id")
                            .from(UserGame::Table, UserGame::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_game_game_id")
                            .from(UserGame::Table, UserGame::GameId)
                            .to(Game::Table, Game::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Last line of defence against duplicate ownership
        manager
            .create_index(
                Index::create()
                    .name("idx_user_game_user_id_game_id")
                    .table(UserGame::Table)
                    .col(UserGame::UserId)
                    .col(UserGame::GameId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_game_game_id")
                    .table(UserGame::Table)
                    .col(UserGame::GameId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserGame::Table).to_owned())
            .await
    }
}
