use sea_orm::DbErr;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::RequestStatus;

/// The kinds of records a validation failure can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Game,
    Genre,
    Platform,
    Developer,
    User,
    LibraryEntry,
    FriendRequest,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Game => "game",
            Self::Genre => "genre",
            Self::Platform => "platform",
            Self::Developer => "developer",
            Self::User => "user",
            Self::LibraryEntry => "library entry",
            Self::FriendRequest => "friend request",
        })
    }
}

/// A violated domain rule. The caller can always recover from one of these: the
/// transaction that raised it has been rolled back and nothing was persisted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} name must not be empty")]
    EmptyName(EntityKind),

    #[error("a game needs at least one {0}")]
    MissingAssociation(EntityKind),

    #[error("no {kind} with id {id}")]
    UnknownReference { kind: EntityKind, id: Uuid },

    #[error("{kind} '{key}' does not exist")]
    NotFound { kind: EntityKind, key: String },

    #[error("a {kind} named '{name}' already exists")]
    Duplicate { kind: EntityKind, name: String },

    #[error("{kind} {id} is still used by {games} game(s)")]
    InUse {
        kind: EntityKind,
        id: Uuid,
        games: u64,
    },

    #[error("game {game_id} is in {owners} user librar(ies) and cannot be deleted")]
    GameInLibraries { game_id: Uuid, owners: u64 },

    #[error("more than one game is named '{0}'")]
    AmbiguousGameName(String),

    #[error("game {game_id} is already in the library")]
    AlreadyInLibrary { game_id: Uuid },

    #[error("game {game_id} is not in the library")]
    NotInLibrary { game_id: Uuid },

    #[error("hours played must be a non-negative number, got {0}")]
    InvalidHours(f64),

    #[error("users cannot send friend requests to themselves")]
    SelfRequest,

    #[error("users are already friends")]
    AlreadyFriends,

    #[error("a pending friend request already exists between these users")]
    PendingRequestExists,

    #[error("only the recipient can answer friend request {request_id}")]
    NotRecipient { request_id: Uuid },

    #[error("friend request {request_id} was already {status}")]
    RequestAlreadyResolved {
        request_id: Uuid,
        status: RequestStatus,
    },

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("invalid password: {0}")]
    InvalidPassword(String),

    #[error("current password is incorrect")]
    InvalidCredentials,
}

impl ValidationError {
    pub(crate) fn not_found(kind: EntityKind, key: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }
}

/// Application error returned by every public operation.
#[derive(Debug, Error)]
pub enum AppError {
    /// A domain rule was violated
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The backing store failed (connectivity, constraint, serialization)
    #[error("store error: {0}")]
    Store(#[from] DbErr),
    /// Anything else, e.g. a password hashing failure
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The validation failure behind this error, if that is what it is.
    #[must_use]
    pub const fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_reference_names_the_kind() {
        let id = Uuid::nil();
        let err = ValidationError::UnknownReference {
            kind: EntityKind::Platform,
            id,
        };
        assert_eq!(err.to_string(), format!("no platform with id {id}"));
    }

    #[test]
    fn test_validation_is_transparent() {
        let err = AppError::from(ValidationError::SelfRequest);
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "users cannot send friend requests to themselves"
        );
        assert_eq!(err.as_validation(), Some(&ValidationError::SelfRequest));
    }

    #[test]
    fn test_store_error_is_not_validation() {
        let err = AppError::from(DbErr::Custom("boom".to_string()));
        assert!(!err.is_validation());
        assert!(err.as_validation().is_none());
    }

    #[test]
    fn test_not_found_formats_key() {
        let err = ValidationError::not_found(EntityKind::User, "alice");
        assert_eq!(err.to_string(), "user 'alice' does not exist");
    }
}
