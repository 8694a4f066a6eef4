//! Memory store behavior under concurrent, interleaved use.

use fitbuddy::memory::{MemoryStore, RetentionPolicy};
use fitbuddy::types::{ConversationTurn, Role};
use std::sync::Arc;

#[tokio::test]
async fn concurrent_interleaved_writes_stay_isolated() {
    let store = Arc::new(MemoryStore::new(RetentionPolicy::BoundedWindow {
        max_turns: 100,
    }));

    let mut handles = Vec::new();
    for i in 0..25 {
        for user in ["alice", "bob"] {
            let store = Arc::clone(&store);
            let user = user.to_string();
            handles.push(tokio::spawn(async move {
                store
                    .append(ConversationTurn::new(
                        &user,
                        "s1",
                        Role::User,
                        format!("{} msg {}", user, i),
                    ))
                    .await;
            }));
        }
    }
    for h in handles {
        h.await.unwrap();
    }

    let alice = store.get_history("alice", "s1", 100).await;
    let bob = store.get_history("bob", "s1", 100).await;

    assert_eq!(alice.len(), 25);
    assert_eq!(bob.len(), 25);
    assert!(alice.iter().all(|t| t.user_id == "alice" && t.text.starts_with("alice")));
    assert!(bob.iter().all(|t| t.user_id == "bob" && t.text.starts_with("bob")));
}

#[tokio::test]
async fn retention_bound_holds_under_concurrent_appends() {
    let store = Arc::new(MemoryStore::new(RetentionPolicy::BoundedWindow {
        max_turns: 5,
    }));

    let mut handles = Vec::new();
    for i in 0..30 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .append(ConversationTurn::new(
                    "u1",
                    "s1",
                    Role::User,
                    format!("msg {}", i),
                ))
                .await;
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    assert_eq!(store.get_history("u1", "s1", 100).await.len(), 5);
}

#[tokio::test]
async fn clearing_one_user_leaves_others_untouched() {
    let store = MemoryStore::new(RetentionPolicy::BoundedWindow { max_turns: 10 });

    store
        .append(ConversationTurn::new("alice", "s1", Role::User, "a"))
        .await;
    store
        .append(ConversationTurn::new("bob", "s1", Role::User, "b"))
        .await;

    assert!(store.clear("alice", "s1").await);

    assert!(store.get_history("alice", "s1", 10).await.is_empty());
    assert_eq!(store.get_history("bob", "s1", 10).await.len(), 1);
}

#[tokio::test]
async fn summarizing_policy_keeps_summary_per_session() {
    let store = MemoryStore::new(RetentionPolicy::Summarizing { max_verbatim: 1 });

    store
        .append(ConversationTurn::new("u1", "s1", Role::User, "I ran 5 km"))
        .await;
    store
        .append(ConversationTurn::new("u1", "s1", Role::Assistant, "Logged it"))
        .await;
    store
        .append(ConversationTurn::new("u1", "s2", Role::User, "other session"))
        .await;

    let summary = store.get_summary("u1", "s1").await.unwrap();
    assert!(summary.contains("I ran 5 km"));
    assert!(store.get_summary("u1", "s2").await.is_none());
}
