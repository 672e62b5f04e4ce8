use sea_orm_migration::prelude::*;

/// Creates the `friend_request` table. Friendships are derived from accepted rows.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum FriendRequest {
    Table,
    Id,
    FromUserId,
    ToUserId,
    Status,
    CreatedAt,
    ResolvedAt,
    PendingPair,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FriendRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FriendRequest::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FriendRequest::FromUserId).uuid().not_null())
                    .col(ColumnDef::new(FriendRequest::ToUserId).uuid().not_null())
                    .col(
                        ColumnDef::new(FriendRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::ResolvedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // Ordered "low:high" user pair while pending, NULL once resolved
                    .col(ColumnDef::new(FriendRequest::PendingPair).string_len(80).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friend_request_from_user_id")
                            .from(FriendRequest::Table, FriendRequest::FromUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friend_request_to_user_id")
                            .from(FriendRequest::Table, FriendRequest::ToUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_friend_request_pending_pair")
                    .table(FriendRequest::Table)
                    .col(FriendRequest::PendingPair)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_friend_request_to_user_id_status")
                    .table(FriendRequest::Table)
                    .col(FriendRequest::ToUserId)
                    .col(FriendRequest::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_friend_request_from_user_id_status")
                    .table(FriendRequest::Table)
                    .col(FriendRequest::FromUserId)
                    .col(FriendRequest::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FriendRequest::Table).to_owned())
            .await
    }
}
