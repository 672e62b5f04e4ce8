mod common;

use chrono::NaiveDate;

use game_library::{
    AppError, AuthService, CatalogService, EntityKind, FriendshipService, LibraryService, Session,
    ValidationError,
};

#[tokio::test]
async fn test_register_then_login() -> Result<(), AppError> {
    let store = common::setup_store().await?;

    let user = AuthService::register(
        &store,
        "alice",
        "hunter2hunter2",
        NaiveDate::from_ymd_opt(1990, 5, 17),
    )
    .await?;
    assert_ne!(user.password_hash, "hunter2hunter2");

    let session = AuthService::login(&store, "alice", "hunter2hunter2").await?;
    assert_eq!(
        session,
        Some(Session {
            user_id: user.id,
            username: "alice".to_string(),
        })
    );

    assert!(
        AuthService::login(&store, "alice", "not-the-password")
            .await?
            .is_none()
    );
    assert!(
        AuthService::login(&store, "mallory", "hunter2hunter2")
            .await?
            .is_none()
    );
    Ok(())
}

#[tokio::test]
async fn test_register_validates_input() -> Result<(), AppError> {
    let store = common::setup_store().await?;

    assert!(matches!(
        common::validation_error(AuthService::register(&store, "al", "password123", None).await),
        Some(ValidationError::InvalidUsername(_))
    ));
    assert!(matches!(
        common::validation_error(AuthService::register(&store, "alice", "short", None).await),
        Some(ValidationError::InvalidPassword(_))
    ));

    AuthService::register(&store, "alice", "password123", None).await?;
    assert_eq!(
        common::validation_error(AuthService::register(&store, "alice", "password456", None).await),
        Some(ValidationError::Duplicate {
            kind: EntityKind::User,
            name: "alice".to_string(),
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_change_password() -> Result<(), AppError> {
    let store = common::setup_store().await?;
    let user = AuthService::register(&store, "alice", "password123", None).await?;

    assert_eq!(
        common::validation_error(
            AuthService::change_password(&store, user.id, "wrong-password", "newpassword1").await
        ),
        Some(ValidationError::InvalidCredentials)
    );

    AuthService::change_password(&store, user.id, "password123", "newpassword1").await?;

    assert!(
        AuthService::login(&store, "alice", "password123")
            .await?
            .is_none()
    );
    assert!(
        AuthService::login(&store, "alice", "newpassword1")
            .await?
            .is_some()
    );
    Ok(())
}

#[tokio::test]
async fn test_delete_user_removes_library_and_requests() -> Result<(), AppError> {
    let store = common::setup_store().await?;
    let refs = common::seed_references(&store).await?;
    let alice = common::insert_user(&store, "alice").await?;
    let bob = common::insert_user(&store, "bob").await?;
    let game = common::create_game(&store, "Tetris", &refs).await?;

    LibraryService::add_game_to_library(&store, alice.id, game.game.id.into()).await?;
    FriendshipService::send_friend_request(&store, alice.id, bob.id).await?;

    AuthService::delete_user(&store, alice.id).await?;

    assert!(
        FriendshipService::get_pending_received(&store, bob.id)
            .await?
            .is_empty()
    );
    assert!(matches!(
        common::validation_error(LibraryService::get_library(&store, alice.id).await),
        Some(ValidationError::NotFound {
            kind: EntityKind::User,
            ..
        })
    ));

    // The game has no owners left, so it can be deleted
    CatalogService::delete_game(&store, game.game.id).await?;

    assert!(matches!(
        common::validation_error(AuthService::delete_user(&store, alice.id).await),
        Some(ValidationError::NotFound { .. })
    ));
    Ok(())
}
