use sea_orm_migration::prelude::*;

/// Creates the `game_genre`, `game_platform` and `game_developer` join tables.
///
/// Join rows follow their game on delete. A genre, platform or developer that is still
/// referenced by a game cannot be deleted.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden, Clone, Copy)]
enum GameGenre {
    Table,
    GameId,
    GenreId,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum GamePlatform {
    Table,
    GameId,
    PlatformId,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum GameDeveloper {
    Table,
    GameId,
    DeveloperId,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Game {
    Table,
    Id,
}

#[derive(DeriveIden, Clone, Copy)]
enum Genre {
    Table,
    Id,
}

#[derive(DeriveIden, Clone, Copy)]
enum Platform {
    Table,
    Id,
}

#[derive(DeriveIden, Clone, Copy)]
enum Developer {
    Table,
    Id,
}

/// Column set of one join table plus the reference table its member column points at.
struct JoinTable<J, M> {
    table: J,
    game_id: J,
    member_id: J,
    created_at: J,
    member_table: M,
    member_table_id: M,
    name: &'static str,
}

impl<J, M> JoinTable<J, M>
where
    J: Iden + Copy + 'static,
    M: Iden + Copy + 'static,
{
    fn create_statement(&self) -> TableCreateStatement {
        Table::create()
            .table(self.table)
            .if_not_exists()
            .col(ColumnDef::new(self.game_id).uuid().not_null())
            .col(ColumnDef::new(self.member_id).uuid().not_null())
            .col(
                ColumnDef::new(self.created_at)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .primary_key(Index::create().col(self.game_id).col(self.member_id))
            .foreign_key(
                ForeignKey::create()
                    .name(format!("fk_{}_game_id", self.name))
                    .from(self.table, self.game_id)
                    .to(Game::Table, Game::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name(format!("fk_{}_member_id", self.name))
                    .from(self.table, self.member_id)
                    .to(self.member_table, self.member_table_id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .to_owned()
    }

    // Reverse lookup: which games use this member
    fn member_index(&self) -> IndexCreateStatement {
        Index::create()
            .name(format!("idx_{}_member_id", self.name))
            .table(self.table)
            .col(self.member_id)
            .to_owned()
    }

    async fn up(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager.create_table(self.create_statement()).await?;
        manager.create_index(self.member_index()).await
    }

    async fn down(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(self.table).to_owned())
            .await
    }
}

const GENRES: JoinTable<GameGenre, Genre> = JoinTable {
    table: GameGenre::Table,
    game_id: GameGenre::GameId,
    member_id: GameGenre::GenreId,
    created_at: GameGenre::CreatedAt,
    member_table: Genre::Table,
    member_table_id: Genre::Id,
    name: "game_genre",
};

const PLATFORMS: JoinTable<GamePlatform, Platform> = JoinTable {
    table: GamePlatform::Table,
    game_id: GamePlatform::GameId,
    member_id: GamePlatform::PlatformId,
    created_at: GamePlatform::CreatedAt,
    member_table: Platform::Table,
    member_table_id: Platform::Id,
    name: "game_platform",
};

const DEVELOPERS: JoinTable<GameDeveloper, Developer> = JoinTable {
    table: GameDeveloper::Table,
    game_id: GameDeveloper::GameId,
    member_id: GameDeveloper::DeveloperId,
    created_at: GameDeveloper::CreatedAt,
    member_table: Developer::Table,
    member_table_id: Developer::Id,
    name: "game_developer",
};

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        GENRES.up(manager).await?;
        PLATFORMS.up(manager).await?;
        DEVELOPERS.up(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        DEVELOPERS.down(manager).await?;
        PLATFORMS.down(manager).await?;
        GENRES.down(manager).await
    }
}
