use sea_orm_migration::prelude::*;

/// Creates the `genre`, `platform` and `developer` reference tables.
///
/// All three share one shape: an id, a unique case-sensitive name and a creation timestamp.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden, Clone, Copy)]
enum Genre {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Platform {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Developer {
    Table,
    Id,
    Name,
    CreatedAt,
}

fn reference_table<T>(table: T, id: T, name: T, created_at: T) -> TableCreateStatement
where
    T: Iden + 'static,
{
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(id).uuid().not_null().primary_key())
        .col(ColumnDef::new(name).string_len(100).not_null().unique_key())
        .col(
            ColumnDef::new(created_at)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(reference_table(
                Genre::Table,
                Genre::Id,
                Genre::Name,
                Genre::CreatedAt,
            ))
            .await?;

        manager
            .create_table(reference_table(
                Platform::Table,
                Platform::Id,
                Platform::Name,
                Platform::CreatedAt,
            ))
            .await?;

        manager
            .create_table(reference_table(
                Developer::Table,
                Developer::Id,
                Developer::Name,
                Developer::CreatedAt,
            ))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Developer::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Platform::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Genre::Table).to_owned())
            .await
    }
}
