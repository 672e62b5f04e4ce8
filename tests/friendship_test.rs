mod common;

use uuid::Uuid;

use game_library::entities::RequestStatus;
use game_library::{AppError, EntityKind, FriendshipService, ValidationError};

#[tokio::test]
async fn test_accept_makes_users_friends_both_ways() -> Result<(), AppError> {
    let store = common::setup_store().await?;
    let alice = common::insert_user(&store, "alice").await?;
    let bob = common::insert_user(&store, "bob").await?;

    let request = FriendshipService::send_friend_request(&store, alice.id, bob.id).await?;
    assert_eq!(request.status, RequestStatus::Pending);
    assert!(!FriendshipService::are_friends(&store, alice.id, bob.id).await?);

    let accepted = FriendshipService::accept_request(&store, request.id, bob.id).await?;
    assert_eq!(accepted.status, RequestStatus::Accepted);
    assert!(accepted.resolved_at.is_some());

    let alice_friends = FriendshipService::get_friends(&store, alice.id).await?;
    let bob_friends = FriendshipService::get_friends(&store, bob.id).await?;
    assert_eq!(alice_friends.len(), 1);
    assert_eq!(alice_friends[0].id, bob.id);
    assert_eq!(bob_friends.len(), 1);
    assert_eq!(bob_friends[0].id, alice.id);
    assert!(FriendshipService::are_friends(&store, bob.id, alice.id).await?);
    Ok(())
}

#[tokio::test]
async fn test_pending_request_blocks_both_directions() -> Result<(), AppError> {
    let store = common::setup_store().await?;
    let alice = common::insert_user(&store, "alice").await?;
    let bob = common::insert_user(&store, "bob").await?;

    FriendshipService::send_friend_request(&store, alice.id, bob.id).await?;

    assert_eq!(
        common::validation_error(
            FriendshipService::send_friend_request(&store, alice.id, bob.id).await
        ),
        Some(ValidationError::PendingRequestExists)
    );
    assert_eq!(
        common::validation_error(
            FriendshipService::send_friend_request(&store, bob.id, alice.id).await
        ),
        Some(ValidationError::PendingRequestExists)
    );

    let sent = FriendshipService::get_sent_pending(&store, alice.id).await?;
    let received = FriendshipService::get_pending_received(&store, bob.id).await?;
    assert_eq!(sent.len(), 1);
    assert_eq!(received.len(), 1);
    assert_eq!(sent[0].id, received[0].id);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_sends_leave_one_pending_request() -> Result<(), AppError> {
    let store = common::setup_store().await?;
    let alice = common::insert_user(&store, "alice").await?;
    let bob = common::insert_user(&store, "bob").await?;

    let (forward, reverse) = tokio::join!(
        FriendshipService::send_friend_request(&store, alice.id, bob.id),
        FriendshipService::send_friend_request(&store, bob.id, alice.id),
    );

    let errors: Vec<Option<ValidationError>> = [forward, reverse]
        .into_iter()
        .filter(Result::is_err)
        .map(common::validation_error)
        .collect();
    assert_eq!(errors, vec![Some(ValidationError::PendingRequestExists)]);

    let pending = FriendshipService::get_sent_pending(&store, alice.id).await?.len()
        + FriendshipService::get_sent_pending(&store, bob.id).await?.len();
    assert_eq!(pending, 1);
    Ok(())
}

#[tokio::test]
async fn test_friends_cannot_request_again() -> Result<(), AppError> {
    let store = common::setup_store().await?;
    let alice = common::insert_user(&store, "alice").await?;
    let bob = common::insert_user(&store, "bob").await?;

    let request = FriendshipService::send_friend_request(&store, alice.id, bob.id).await?;
    FriendshipService::accept_request(&store, request.id, bob.id).await?;

    assert_eq!(
        common::validation_error(
            FriendshipService::send_friend_request(&store, bob.id, alice.id).await
        ),
        Some(ValidationError::AlreadyFriends)
    );
    Ok(())
}

#[tokio::test]
async fn test_resolved_request_cannot_change() -> Result<(), AppError> {
    let store = common::setup_store().await?;
    let alice = common::insert_user(&store, "alice").await?;
    let bob = common::insert_user(&store, "bob").await?;

    let request = FriendshipService::send_friend_request(&store, alice.id, bob.id).await?;
    FriendshipService::accept_request(&store, request.id, bob.id).await?;

    assert_eq!(
        common::validation_error(FriendshipService::reject_request(&store, request.id, bob.id).await),
        Some(ValidationError::RequestAlreadyResolved {
            request_id: request.id,
            status: RequestStatus::Accepted,
        })
    );
    assert!(FriendshipService::are_friends(&store, alice.id, bob.id).await?);
    Ok(())
}

#[tokio::test]
async fn test_reject_then_resend() -> Result<(), AppError> {
    let store = common::setup_store().await?;
    let alice = common::insert_user(&store, "alice").await?;
    let bob = common::insert_user(&store, "bob").await?;

    let request = FriendshipService::send_friend_request(&store, alice.id, bob.id).await?;
    let rejected = FriendshipService::reject_request(&store, request.id, bob.id).await?;
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert!(
        FriendshipService::get_pending_received(&store, bob.id)
            .await?
            .is_empty()
    );

    let again = FriendshipService::send_friend_request(&store, alice.id, bob.id).await?;
    assert_ne!(again.id, request.id);
    assert!(!FriendshipService::are_friends(&store, alice.id, bob.id).await?);
    Ok(())
}

#[tokio::test]
async fn test_only_recipient_can_answer() -> Result<(), AppError> {
    let store = common::setup_store().await?;
    let alice = common::insert_user(&store, "alice").await?;
    let bob = common::insert_user(&store, "bob").await?;

    let request = FriendshipService::send_friend_request(&store, alice.id, bob.id).await?;

    assert_eq!(
        common::validation_error(
            FriendshipService::accept_request(&store, request.id, alice.id).await
        ),
        Some(ValidationError::NotRecipient {
            request_id: request.id,
        })
    );
    assert!(matches!(
        common::validation_error(
            FriendshipService::accept_request(&store, Uuid::new_v4(), bob.id).await
        ),
        Some(ValidationError::NotFound {
            kind: EntityKind::FriendRequest,
            ..
        })
    ));
    Ok(())
}

#[tokio::test]
async fn test_self_request_and_unknown_user() -> Result<(), AppError> {
    let store = common::setup_store().await?;
    let alice = common::insert_user(&store, "alice").await?;

    assert_eq!(
        common::validation_error(
            FriendshipService::send_friend_request(&store, alice.id, alice.id).await
        ),
        Some(ValidationError::SelfRequest)
    );

    let ghost = Uuid::new_v4();
    assert_eq!(
        common::validation_error(FriendshipService::send_friend_request(&store, ghost, ghost).await),
        Some(ValidationError::SelfRequest)
    );
    assert!(matches!(
        common::validation_error(
            FriendshipService::send_friend_request(&store, alice.id, ghost).await
        ),
        Some(ValidationError::NotFound {
            kind: EntityKind::User,
            ..
        })
    ));
    Ok(())
}

#[tokio::test]
async fn test_friends_ordered_by_username() -> Result<(), AppError> {
    let store = common::setup_store().await?;
    let alice = common::insert_user(&store, "alice").await?;
    let carol = common::insert_user(&store, "carol").await?;
    let bob = common::insert_user(&store, "bob").await?;

    for friend in [&carol, &bob] {
        let request = FriendshipService::send_friend_request(&store, alice.id, friend.id).await?;
        FriendshipService::accept_request(&store, request.id, friend.id).await?;
    }

    let friends = FriendshipService::get_friends(&store, alice.id).await?;
    let names: Vec<&str> = friends.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["bob", "carol"]);
    Ok(())
}
