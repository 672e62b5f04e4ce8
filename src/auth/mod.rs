//! Accounts and the explicit session identity passed into the other services.

pub mod password;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    Set,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{friend_request, user, user_game};
use crate::errors::{AppError, EntityKind, ValidationError};
use crate::store::Store;

/// The signed-in user. Produced by [`AuthService::login`] and handed to operations
/// explicitly by whatever front end drives the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: Uuid,
    pub username: String,
}

impl From<&user::Model> for Session {
    fn from(user: &user::Model) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}

pub struct AuthService;

impl AuthService {
    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUsername`] / [`ValidationError::InvalidPassword`]
    /// for malformed input and [`ValidationError::Duplicate`] if the username is taken.
    pub async fn register(
        store: &Store,
        username: &str,
        password: &str,
        birth_date: Option<NaiveDate>,
    ) -> Result<user::Model, AppError> {
        let username = username.trim().to_string();
        password::validate_username(&username)?;
        password::validate_password(password)?;
        let password_hash = password::hash_password(password)?;

        store
            .run_in_transaction(move |txn| {
                Box::pin(insert_user(txn, username, password_hash, birth_date))
            })
            .await
    }

    /// Check credentials. Unknown usernames and wrong passwords both yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the lookup fails, or [`AppError::Internal`] if the
    /// stored hash is corrupt.
    pub async fn login(
        store: &Store,
        username: &str,
        password: &str,
    ) -> Result<Option<Session>, AppError> {
        let username = username.trim().to_string();
        let password = password.to_string();

        let session = store
            .run_read_only(move |db| {
                Box::pin(async move {
                    let Some(user) = find_by_username(db, &username).await? else {
                        return Ok(None);
                    };
                    if !password::verify_password(&password, &user.password_hash)? {
                        return Ok(None);
                    }
                    Ok(Some(Session::from(&user)))
                })
            })
            .await?;

        match &session {
            Some(session) => tracing::info!(user_id = %session.user_id, "User logged in"),
            None => tracing::debug!("Login rejected"),
        }
        Ok(session)
    }

    /// Replace the password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCredentials`] if `current` does not match,
    /// [`ValidationError::InvalidPassword`] for a malformed new password and
    /// [`ValidationError::NotFound`] for an unknown user.
    pub async fn change_password(
        store: &Store,
        user_id: Uuid,
        current: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        password::validate_password(new_password)?;
        let current = current.to_string();
        let new_hash = password::hash_password(new_password)?;

        store
            .run_in_transaction(move |txn| {
                Box::pin(async move {
                    let user = find_user(txn, user_id).await?;
                    if !password::verify_password(&current, &user.password_hash)? {
                        return Err(ValidationError::InvalidCredentials.into());
                    }

                    let mut active: user::ActiveModel = user.into();
                    active.password_hash = Set(new_hash);
                    active.updated_at = Set(Utc::now().fixed_offset());
                    active.update(txn).await?;

                    tracing::info!(%user_id, "Password changed");
                    Ok(())
                })
            })
            .await
    }

    /// Delete an account together with its library entries and friend requests.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFound`] if the user does not exist.
    pub async fn delete_user(store: &Store, user_id: Uuid) -> Result<(), AppError> {
        store
            .run_in_transaction(move |txn| Box::pin(remove_user(txn, user_id)))
            .await
    }
}

async fn insert_user(
    txn: &DatabaseTransaction,
    username: String,
    password_hash: String,
    birth_date: Option<NaiveDate>,
) -> Result<user::Model, AppError> {
    if find_by_username(txn, &username).await?.is_some() {
        return Err(ValidationError::Duplicate {
            kind: EntityKind::User,
            name: username,
        }
        .into());
    }

    let now = Utc::now().fixed_offset();
    let user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        password_hash: Set(password_hash),
        birth_date: Set(birth_date),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");
    Ok(user)
}

async fn remove_user(txn: &DatabaseTransaction, user_id: Uuid) -> Result<(), AppError> {
    find_user(txn, user_id).await?;

    let entries = user_game::Entity::delete_many()
        .filter(user_game::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;
    let requests = friend_request::Entity::delete_many()
        .filter(
            friend_request::Column::FromUserId
                .eq(user_id)
                .or(friend_request::Column::ToUserId.eq(user_id)),
        )
        .exec(txn)
        .await?;
    user::Entity::delete_by_id(user_id).exec(txn).await?;

    tracing::info!(
        %user_id,
        library_entries = entries.rows_affected,
        friend_requests = requests.rows_affected,
        "User deleted"
    );
    Ok(())
}

async fn find_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| ValidationError::not_found(EntityKind::User, user_id).into())
}

async fn find_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> Result<Option<user::Model>, sea_orm::DbErr> {
    user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(conn)
        .await
}
