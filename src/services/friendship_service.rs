use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::entities::{RequestStatus, friend_request, user};
use crate::errors::{AppError, EntityKind, ValidationError};
use crate::store::Store;

/// Friend requests and the friendships derived from them.
///
/// Friendship is never stored on its own: two users are friends exactly when an accepted
/// request exists between them, in either direction.
pub struct FriendshipService;

impl FriendshipService {
    /// Send a friend request from `from_user_id` to `to_user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::SelfRequest`] when both ids are equal (whether or not the
    /// user exists), [`ValidationError::NotFound`] for an unknown user,
    /// [`ValidationError::AlreadyFriends`], or [`ValidationError::PendingRequestExists`]
    /// when either side already has a pending request to the other.
    pub async fn send_friend_request(
        store: &Store,
        from_user_id: Uuid,
        to_user_id: Uuid,
    ) -> Result<friend_request::Model, AppError> {
        store
            .run_in_transaction(move |txn| Box::pin(insert_request(txn, from_user_id, to_user_id)))
            .await
    }

    /// Accept a pending request. Only its recipient may do so.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`], [`ValidationError::NotRecipient`], or
    /// [`ValidationError::RequestAlreadyResolved`] if the request is no longer pending.
    pub async fn accept_request(
        store: &Store,
        request_id: Uuid,
        acting_user_id: Uuid,
    ) -> Result<friend_request::Model, AppError> {
        store
            .run_in_transaction(move |txn| {
                Box::pin(resolve_request(
                    txn,
                    request_id,
                    acting_user_id,
                    RequestStatus::Accepted,
                ))
            })
            .await
    }

    /// Reject a pending request. Same rules as [`FriendshipService::accept_request`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`], [`ValidationError::NotRecipient`], or
    /// [`ValidationError::RequestAlreadyResolved`] if the request is no longer pending.
    pub async fn reject_request(
        store: &Store,
        request_id: Uuid,
        acting_user_id: Uuid,
    ) -> Result<friend_request::Model, AppError> {
        store
            .run_in_transaction(move |txn| {
                Box::pin(resolve_request(
                    txn,
                    request_id,
                    acting_user_id,
                    RequestStatus::Rejected,
                ))
            })
            .await
    }

    /// Pending requests addressed to `user_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the query fails.
    pub async fn get_pending_received(
        store: &Store,
        user_id: Uuid,
    ) -> Result<Vec<friend_request::Model>, AppError> {
        store
            .run_read_only(move |db| {
                Box::pin(async move {
                    Ok(friend_request::Entity::find()
                        .filter(friend_request::Column::ToUserId.eq(user_id))
                        .filter(friend_request::Column::Status.eq(RequestStatus::Pending))
                        .order_by_asc(friend_request::Column::CreatedAt)
                        .all(db)
                        .await?)
                })
            })
            .await
    }

    /// Pending requests sent by `user_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the query fails.
    pub async fn get_sent_pending(
        store: &Store,
        user_id: Uuid,
    ) -> Result<Vec<friend_request::Model>, AppError> {
        store
            .run_read_only(move |db| {
                Box::pin(async move {
                    Ok(friend_request::Entity::find()
                        .filter(friend_request::Column::FromUserId.eq(user_id))
                        .filter(friend_request::Column::Status.eq(RequestStatus::Pending))
                        .order_by_asc(friend_request::Column::CreatedAt)
                        .all(db)
                        .await?)
                })
            })
            .await
    }

    /// Everyone `user_id` is friends with, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the query fails.
    pub async fn get_friends(store: &Store, user_id: Uuid) -> Result<Vec<user::Model>, AppError> {
        store
            .run_read_only(move |db| {
                Box::pin(async move {
                    let accepted = friend_request::Entity::find()
                        .filter(involving(user_id))
                        .filter(friend_request::Column::Status.eq(RequestStatus::Accepted))
                        .all(db)
                        .await?;

                    let friend_ids: BTreeSet<Uuid> = accepted
                        .iter()
                        .map(|request| request.counterpart(user_id))
                        .collect();
                    if friend_ids.is_empty() {
                        return Ok(Vec::new());
                    }

                    Ok(user::Entity::find()
                        .filter(user::Column::Id.is_in(friend_ids))
                        .order_by_asc(user::Column::Username)
                        .all(db)
                        .await?)
                })
            })
            .await
    }

    /// Whether the two users are friends.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the query fails.
    pub async fn are_friends(store: &Store, a: Uuid, b: Uuid) -> Result<bool, AppError> {
        store
            .run_read_only(move |db| {
                Box::pin(async move {
                    let accepted = count_between(db, a, b, RequestStatus::Accepted).await?;
                    Ok(accepted > 0)
                })
            })
            .await
    }
}

async fn insert_request(
    txn: &DatabaseTransaction,
    from_user_id: Uuid,
    to_user_id: Uuid,
) -> Result<friend_request::Model, AppError> {
    if from_user_id == to_user_id {
        return Err(ValidationError::SelfRequest.into());
    }
    for user_id in [from_user_id, to_user_id] {
        if user::Entity::find_by_id(user_id).one(txn).await?.is_none() {
            return Err(ValidationError::not_found(EntityKind::User, user_id).into());
        }
    }

    if count_between(txn, from_user_id, to_user_id, RequestStatus::Accepted).await? > 0 {
        return Err(ValidationError::AlreadyFriends.into());
    }
    if count_between(txn, from_user_id, to_user_id, RequestStatus::Pending).await? > 0 {
        return Err(ValidationError::PendingRequestExists.into());
    }

    let request = insert_pending(txn, from_user_id, to_user_id).await?;

    tracing::info!(
        request_id = %request.id,
        from = %from_user_id,
        to = %to_user_id,
        "Friend request sent"
    );
    Ok(request)
}

/// Insert a pending request. The unique pending-pair index rejects a second pending
/// request between the same users even when a concurrent send passed the count check.
async fn insert_pending(
    txn: &DatabaseTransaction,
    from_user_id: Uuid,
    to_user_id: Uuid,
) -> Result<friend_request::Model, AppError> {
    friend_request::ActiveModel {
        id: Set(Uuid::new_v4()),
        from_user_id: Set(from_user_id),
        to_user_id: Set(to_user_id),
        status: Set(RequestStatus::Pending),
        created_at: Set(Utc::now().fixed_offset()),
        resolved_at: Set(None),
        pending_pair: Set(Some(friend_request::pair_key(from_user_id, to_user_id))),
    }
    .insert(txn)
    .await
    .map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ValidationError::PendingRequestExists.into(),
        _ => AppError::from(err),
    })
}

/// Move a pending request to `outcome`, re-reading its status inside the writing
/// transaction so a concurrent accept/reject cannot both succeed.
async fn resolve_request(
    txn: &DatabaseTransaction,
    request_id: Uuid,
    acting_user_id: Uuid,
    outcome: RequestStatus,
) -> Result<friend_request::Model, AppError> {
    let request = friend_request::Entity::find_by_id(request_id)
        .one(txn)
        .await?
        .ok_or_else(|| ValidationError::not_found(EntityKind::FriendRequest, request_id))?;

    if request.to_user_id != acting_user_id {
        return Err(ValidationError::NotRecipient { request_id }.into());
    }
    if !request.status.can_resolve() {
        return Err(ValidationError::RequestAlreadyResolved {
            request_id,
            status: request.status,
        }
        .into());
    }

    // Compare-and-set: only flip the row if it is still pending
    let result = friend_request::Entity::update_many()
        .col_expr(friend_request::Column::Status, outcome.into())
        .col_expr(
            friend_request::Column::ResolvedAt,
            Some(Utc::now().fixed_offset()).into(),
        )
        .col_expr(friend_request::Column::PendingPair, Option::<String>::None.into())
        .filter(friend_request::Column::Id.eq(request_id))
        .filter(friend_request::Column::Status.eq(RequestStatus::Pending))
        .exec(txn)
        .await?;
    if result.rows_affected == 0 {
        let current = friend_request::Entity::find_by_id(request_id)
            .one(txn)
            .await?
            .map_or(request.status, |r| r.status);
        return Err(ValidationError::RequestAlreadyResolved {
            request_id,
            status: current,
        }
        .into());
    }

    let request = friend_request::Entity::find_by_id(request_id)
        .one(txn)
        .await?
        .ok_or_else(|| ValidationError::not_found(EntityKind::FriendRequest, request_id))?;

    tracing::info!(
        %request_id,
        from = %request.from_user_id,
        to = %request.to_user_id,
        status = %request.status,
        "Friend request resolved"
    );
    Ok(request)
}

/// Requests where `user_id` is either the sender or the recipient.
fn involving(user_id: Uuid) -> Condition {
    Condition::any()
        .add(friend_request::Column::FromUserId.eq(user_id))
        .add(friend_request::Column::ToUserId.eq(user_id))
}

/// Requests between `a` and `b` in either direction.
fn between(a: Uuid, b: Uuid) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(friend_request::Column::FromUserId.eq(a))
                .add(friend_request::Column::ToUserId.eq(b)),
        )
        .add(
            Condition::all()
                .add(friend_request::Column::FromUserId.eq(b))
                .add(friend_request::Column::ToUserId.eq(a)),
        )
}

async fn count_between<C: ConnectionTrait>(
    conn: &C,
    a: Uuid,
    b: Uuid,
    status: RequestStatus,
) -> Result<u64, DbErr> {
    friend_request::Entity::find()
        .filter(between(a, b))
        .filter(friend_request::Column::Status.eq(status))
        .count(conn)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    async fn store_with_users() -> Result<(Store, Uuid, Uuid), AppError> {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await?;
        Migrator::up(&db, None).await?;

        let mut ids = Vec::new();
        for username in ["alice", "bob"] {
            let now = Utc::now().fixed_offset();
            let user = user::ActiveModel {
                id: Set(Uuid::new_v4()),
                username: Set(username.to_string()),
                password_hash: Set(String::new()),
                birth_date: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&db)
            .await?;
            ids.push(user.id);
        }

        Ok((Store::new(db), ids[0], ids[1]))
    }

    #[tokio::test]
    async fn test_pending_pair_index_rejects_reverse_request() -> Result<(), AppError> {
        let (store, alice, bob) = store_with_users().await?;

        // Skips the count check, as a concurrent send in the other direction would
        store
            .run_in_transaction(move |txn| Box::pin(insert_pending(txn, alice, bob)))
            .await?;
        let reverse = store
            .run_in_transaction(move |txn| Box::pin(insert_pending(txn, bob, alice)))
            .await;

        assert_eq!(
            reverse.as_ref().err().and_then(AppError::as_validation),
            Some(&ValidationError::PendingRequestExists)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_resolving_frees_the_pending_pair() -> Result<(), AppError> {
        let (store, alice, bob) = store_with_users().await?;

        let first = store
            .run_in_transaction(move |txn| Box::pin(insert_pending(txn, alice, bob)))
            .await?;
        let rejected = store
            .run_in_transaction(move |txn| {
                Box::pin(resolve_request(txn, first.id, bob, RequestStatus::Rejected))
            })
            .await?;
        assert_eq!(rejected.pending_pair, None);

        let second = store
            .run_in_transaction(move |txn| Box::pin(insert_pending(txn, bob, alice)))
            .await?;
        assert_eq!(second.pending_pair, Some(friend_request::pair_key(alice, bob)));
        Ok(())
    }
}
