//! Store Integration Tests
//!
//! End-to-end scenarios over the public `ChatStore` and `ChatService` API.
//!
//! Run with: cargo test -p integration-tests --test store_tests

use std::sync::Arc;
use std::thread;

use anyhow::Result;
use chat_common::{AppConfig, AppError, ErrorResponse};
use chat_core::{ChatKind, ErrorKind};
use chat_store::{ChatService, ChatStore, SUCCESS};
use integration_tests::{
    fixtures::*, init_test_tracing, mark, send, store_with_cast, store_with_group,
};

// ============================================================================
// Registry Tests
// ============================================================================

#[test]
fn test_duplicate_mobile_rejected() -> Result<()> {
    let cast = Cast::new();
    let store = store_with_cast(&cast)?;

    let err = store.create_user("Impostor", &cast.alice.mobile).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::DuplicateEntity));
    assert_eq!(store.user(&cast.alice.mobile).map(|u| u.name), Some("Alice".to_string()));
    assert_eq!(store.user_count(), 3);
    Ok(())
}

#[test]
fn test_unique_users_register_independently() -> Result<()> {
    init_test_tracing();
    let store = ChatStore::new();
    let service = ChatService::new(&store);

    for _ in 0..5 {
        let user = unique_user("Member");
        assert_eq!(service.create_user(&user.name, &user.mobile)?, SUCCESS);
    }
    assert_eq!(store.user_count(), 5);
    Ok(())
}

// ============================================================================
// Chat Creation Tests
// ============================================================================

#[test]
fn test_personal_and_group_chats() -> Result<()> {
    let cast = Cast::new();
    let store = store_with_cast(&cast)?;

    let personal = store.create_chat(&cast.alice.mobile, &[&cast.bob.mobile])?;
    assert_eq!(personal.kind, ChatKind::Personal);
    assert_eq!(personal.name, "Bob");
    assert_eq!(personal.participant_count(), 2);
    assert_eq!(personal.members(), ["111", "222"]);

    let group = store.create_chat(&cast.bob.mobile, &[&cast.carol.mobile, &cast.alice.mobile])?;
    assert_eq!(group.kind, ChatKind::Group);
    assert_eq!(group.name, "Group 1");
    assert_eq!(group.participant_count(), 3);
    assert_eq!(group.members(), ["222", "333", "111"]);

    let second = store.create_chat(&cast.carol.mobile, &[&cast.alice.mobile, &cast.bob.mobile])?;
    assert_eq!(second.name, "Group 2");
    assert_eq!(store.group_count(), 3);
    Ok(())
}

#[test]
fn test_user_named_like_next_group_does_not_block_group_chats() -> Result<()> {
    let cast = Cast::new();
    let store = store_with_cast(&cast)?;
    store.create_user("Group 1", "444")?;

    let personal = store.create_chat(&cast.alice.mobile, &["444"])?;
    assert_eq!(personal.name, "Group 1");
    assert_eq!(personal.kind, ChatKind::Personal);

    let names: Vec<String> = (0..3)
        .map(|_| {
            store
                .create_chat(&cast.alice.mobile, &[&cast.bob.mobile, &cast.carol.mobile])
                .map(|group| group.name)
        })
        .collect::<Result<_, _>>()?;
    assert_eq!(names, ["Group 2", "Group 3", "Group 4"]);
    assert_eq!(store.group_count(), 4);
    store.verify()?;
    Ok(())
}

#[test]
fn test_rejected_chat_does_not_consume_group_number() -> Result<()> {
    let cast = Cast::new();
    let store = store_with_cast(&cast)?;

    let err = store
        .create_chat(&cast.alice.mobile, &[&cast.bob.mobile, &cast.alice.mobile])
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::DuplicateEntity));

    let err = store.create_chat(&cast.alice.mobile, &["999", "222"]).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));

    let err = ChatService::new(&store).create_group(&[]).unwrap_err();
    assert!(err.is_invalid_argument());

    let group = store.create_chat(&cast.alice.mobile, &[&cast.bob.mobile, &cast.carol.mobile])?;
    assert_eq!(group.name, "Group 1");
    assert_eq!(store.group_count(), 1);
    Ok(())
}

#[test]
fn test_group_prefix_from_configuration() -> Result<()> {
    let config = AppConfig::from_lookup(|key| match key {
        "GROUP_NAME_PREFIX" => Some("Room".to_string()),
        _ => None,
    })?;
    let store = ChatStore::new_shared(config.store);
    let cast = Cast::new();
    for user in cast.all() {
        store.create_user(&user.name, &user.mobile)?;
    }

    let group = ChatService::new(&store).create_group(&cast.all())?;
    assert_eq!(group.name, "Room 1");
    Ok(())
}

// ============================================================================
// Messaging Tests
// ============================================================================

#[test]
fn test_send_returns_running_count() -> Result<()> {
    let cast = Cast::new();
    let (store, group) = store_with_group(&cast)?;

    for (expected, sender) in [&cast.alice, &cast.bob, &cast.carol, &cast.alice]
        .into_iter()
        .enumerate()
    {
        let id = store.create_message("hi");
        assert_eq!(store.send_message(id, &sender.mobile, &group.name)?, expected + 1);
    }

    assert_eq!(store.user_messages(&cast.alice.mobile)?.len(), 2);
    store.verify()?;
    Ok(())
}

#[test]
fn test_send_failures() -> Result<()> {
    let cast = Cast::new();
    let store = store_with_cast(&cast)?;
    let chat = store.create_chat(&cast.alice.mobile, &[&cast.bob.mobile])?;
    let id = store.create_message("secret");

    let err = store.send_message(id, &cast.carol.mobile, &chat.name).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::PermissionDenied));

    let err = store.send_message(id, &cast.alice.mobile, "Nowhere").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));

    assert_eq!(store.send_message(id, &cast.alice.mobile, &chat.name)?, 1);
    let err = store.send_message(id, &cast.bob.mobile, &chat.name).unwrap_err();
    assert!(err.is_duplicate());

    assert_eq!(store.group_messages(&chat.name)?.len(), 1);
    store.verify()?;
    Ok(())
}

// ============================================================================
// Admin Tests
// ============================================================================

#[test]
fn test_change_admin_requires_current_admin() -> Result<()> {
    let cast = Cast::new();
    let (store, group) = store_with_group(&cast)?;

    let err = store
        .change_admin(&cast.bob.mobile, &cast.carol.mobile, &group.name)
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::PermissionDenied));

    store.change_admin(&cast.alice.mobile, &cast.bob.mobile, &group.name)?;
    assert_eq!(store.admin(&group.name).map(|u| u.name), Some("Bob".to_string()));

    // Old admin stays a member, listed once
    let group = store.group(&group.name).expect("group exists");
    assert!(group.is_member(&cast.alice.mobile));
    assert_eq!(group.participant_count(), 3);
    store.verify()?;
    Ok(())
}

// ============================================================================
// Removal Tests
// ============================================================================

#[test]
fn test_remove_member_cascades() -> Result<()> {
    let cast = Cast::new();
    let (store, group) = store_with_group(&cast)?;

    let kept = send(&store, "from alice", &cast.alice.mobile, &group.name)?;
    let gone_1 = send(&store, "from carol", &cast.carol.mobile, &group.name)?;
    let gone_2 = send(&store, "carol again", &cast.carol.mobile, &group.name)?;
    let unsent = store.create_message("draft");

    let summary = store.remove_user(&cast.carol.mobile)?;
    assert_eq!(summary.user.name, "Carol");
    assert_eq!(summary.removed_messages, 2);
    assert_eq!(summary.total_messages, 2);

    let outcome = summary.group(&group.name).expect("group affected");
    assert_eq!(outcome.participant_count, 2);
    assert_eq!(outcome.message_count, 1);
    assert_eq!(summary.legacy_code(), 2 + 1 + 2);

    assert!(store.user(&cast.carol.mobile).is_none());
    assert!(store.message(gone_1).is_none());
    assert!(store.message(gone_2).is_none());
    assert!(store.message(kept).is_some());
    assert!(store.message(unsent).is_some());

    let remaining: Vec<_> = store.group_messages(&group.name)?.into_iter().map(|m| m.id).collect();
    assert_eq!(remaining, [kept]);
    assert!(!store.group(&group.name).expect("group exists").is_member(&cast.carol.mobile));
    store.verify()?;
    Ok(())
}

#[test]
fn test_remove_user_failures() -> Result<()> {
    let cast = Cast::new();
    let (store, group) = store_with_group(&cast)?;
    let loner = unique_user("Loner");
    store.create_user(&loner.name, &loner.mobile)?;

    let err = store.remove_user(&cast.alice.mobile).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::PermissionDenied));

    let err = store.remove_user(&loner.mobile).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));

    let err = store.remove_user("000").unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(store.user_count(), 4);
    assert_eq!(store.group(&group.name).expect("group exists").participant_count(), 3);
    Ok(())
}

#[test]
fn test_removed_ids_are_not_reused() -> Result<()> {
    let cast = Cast::new();
    let (store, group) = store_with_group(&cast)?;

    let last = send(&store, "bye", &cast.carol.mobile, &group.name)?;
    store.remove_user(&cast.carol.mobile)?;

    let next = store.create_message("hello");
    assert!(next > last);
    Ok(())
}

// ============================================================================
// Search Tests
// ============================================================================

#[test]
fn test_find_message_in_window() -> Result<()> {
    let cast = Cast::new();
    let (store, group) = store_with_group(&cast)?;

    send(&store, "too early", &cast.alice.mobile, &group.name)?;
    let start = mark();
    send(&store, "first", &cast.alice.mobile, &group.name)?;
    send(&store, "second", &cast.bob.mobile, &group.name)?;
    send(&store, "third", &cast.carol.mobile, &group.name)?;
    let end = mark();
    send(&store, "too late", &cast.alice.mobile, &group.name)?;

    assert_eq!(store.find_message(start, end, 1)?, "third");
    assert_eq!(store.find_message(start, end, 3)?, "first");

    let err = store.find_message(start, end, 4).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::RangeError));
    let err = store.find_message(start, end, 0).unwrap_err();
    assert!(err.is_range());

    let recent: Vec<_> = store
        .recent_messages(start, end, 2)
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(recent, ["third", "second"]);
    Ok(())
}

#[test]
fn test_find_message_ignores_removed_messages() -> Result<()> {
    let cast = Cast::new();
    let (store, group) = store_with_group(&cast)?;

    let start = mark();
    send(&store, "alice", &cast.alice.mobile, &group.name)?;
    send(&store, "carol", &cast.carol.mobile, &group.name)?;
    let end = mark();

    store.remove_user(&cast.carol.mobile)?;
    assert_eq!(store.find_message(start, end, 1)?, "alice");
    assert!(store.find_message(start, end, 2).is_err());
    Ok(())
}

// ============================================================================
// Error Mapping Tests
// ============================================================================

#[test]
fn test_store_errors_map_to_responses() -> Result<()> {
    let cast = Cast::new();
    let (store, group) = store_with_group(&cast)?;

    let err: AppError = store.remove_user(&cast.alice.mobile).unwrap_err().into();
    assert_eq!(err.status_code(), 403);

    let id = store.create_message("x");
    let err: AppError = store.send_message(id, "999", &group.name).unwrap_err().into();
    assert_eq!(err.status_code(), 404);

    let response = serde_json::to_value(ErrorResponse::from(err))?;
    assert_eq!(response["code"], "UNKNOWN_USER");
    assert_eq!(response["kind"], "NOT_FOUND");
    Ok(())
}

// ============================================================================
// Full Scenario
// ============================================================================

#[test]
fn test_full_scenario() -> Result<()> {
    let cast = Cast::new();
    let store = store_with_cast(&cast)?;
    let service = ChatService::new(&store);

    let group = service.create_group(&cast.all())?;
    assert_eq!(group.name, "Group 1");
    assert_eq!(group.participant_count(), 3);
    assert_eq!(group.admin(), cast.alice.mobile);

    assert_eq!(service.change_admin(&cast.alice, &cast.bob, &group)?, SUCCESS);
    let err = service.change_admin(&cast.alice, &cast.carol, &group).unwrap_err();
    assert!(err.is_permission_denied());

    assert_eq!(service.remove_user(&cast.alice)?, 2);
    let err = service.remove_user(&cast.bob).unwrap_err();
    assert!(err.is_permission_denied());

    store.verify()?;
    Ok(())
}

#[test]
fn test_shared_store_across_threads() -> Result<()> {
    let cast = Cast::new();
    let (store, group) = store_with_group(&cast)?;
    let store = Arc::new(store);

    thread::scope(|scope| -> Result<()> {
        let handles: Vec<_> = cast
            .all()
            .into_iter()
            .map(|user| {
                let store = Arc::clone(&store);
                let group = group.name.clone();
                scope.spawn(move || -> Result<()> {
                    for i in 0..25 {
                        let id = store.create_message(&format!("{}-{i}", user.name));
                        store.send_message(id, &user.mobile, &group)?;
                    }
                    Ok(())
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("sender thread panicked")?;
        }
        Ok(())
    })?;

    assert_eq!(store.group_messages(&group.name)?.len(), 75);
    assert_eq!(store.message_count(), 75);
    store.verify()?;
    Ok(())
}
