//! Keyed conversation store
//!
//! A map from (user_id, session_id) to an append-only log, guarded by a
//! per-key async mutex so concurrent requests for the same session append
//! in a consistent, non-interleaved order. Different keys share nothing;
//! cross-user isolation is absolute.
//!
//! Retention is configurable: bounded-window keeps the last N turns,
//! summarizing additionally collapses evicted turns into a rolling summary.

use crate::api::{GlobalMemoryStats, MemoryStats};
use crate::config::{MemoryConfig, RetentionKind};
use crate::types::{ConversationTurn, Role};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Retention policy for one store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Keep only the last `max_turns` turns
    BoundedWindow { max_turns: usize },
    /// Keep the last `max_verbatim` turns verbatim, folding older ones
    /// into a rolling summary
    Summarizing { max_verbatim: usize },
}

impl RetentionPolicy {
    pub fn from_config(config: &MemoryConfig) -> Self {
        match config.retention {
            RetentionKind::BoundedWindow => RetentionPolicy::BoundedWindow {
                max_turns: config.max_turns,
            },
            RetentionKind::Summarizing => RetentionPolicy::Summarizing {
                max_verbatim: config.max_turns,
            },
        }
    }

    fn bound(&self) -> usize {
        match self {
            RetentionPolicy::BoundedWindow { max_turns } => *max_turns,
            RetentionPolicy::Summarizing { max_verbatim } => *max_verbatim,
        }
    }
}

#[derive(Debug, Default)]
struct SessionLog {
    turns: VecDeque<ConversationTurn>,
    summary: Option<String>,
}

type SessionKey = (String, String);

/// Per-user, per-session conversation memory
pub struct MemoryStore {
    sessions: RwLock<HashMap<SessionKey, Arc<Mutex<SessionLog>>>>,
    policy: RetentionPolicy,
}

impl MemoryStore {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            policy,
        }
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(RetentionPolicy::from_config(config))
    }

    async fn session(&self, user_id: &str, session_id: &str) -> Arc<Mutex<SessionLog>> {
        let key = (user_id.to_string(), session_id.to_string());

        {
            let sessions = self.sessions.read().await;
            if let Some(log) = sessions.get(&key) {
                return Arc::clone(log);
            }
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(sessions.entry(key).or_default())
    }

    /// Append one turn, applying the retention policy.
    ///
    /// Writes for the same (user, session) are serialized through the
    /// per-key mutex; different keys never contend.
    pub async fn append(&self, turn: ConversationTurn) {
        let log = self.session(&turn.user_id, &turn.session_id).await;
        let mut log = log.lock().await;

        log.turns.push_back(turn);
        self.apply_retention(&mut log);
    }

    /// Append both turns of one exchange under a single lock acquisition.
    ///
    /// Concurrent requests for the same (user, session) may order their
    /// exchanges either way, but a user turn and its reply are never
    /// split by another request's turns.
    pub async fn append_exchange(
        &self,
        user_turn: ConversationTurn,
        assistant_turn: ConversationTurn,
    ) {
        let log = self
            .session(&user_turn.user_id, &user_turn.session_id)
            .await;
        let mut log = log.lock().await;

        log.turns.push_back(user_turn);
        log.turns.push_back(assistant_turn);
        self.apply_retention(&mut log);
    }

    fn apply_retention(&self, log: &mut SessionLog) {
        let bound = self.policy.bound();
        while log.turns.len() > bound {
            let evicted = log.turns.pop_front();
            if let (RetentionPolicy::Summarizing { .. }, Some(turn)) = (self.policy, evicted) {
                fold_into_summary(&mut log.summary, &turn);
            }
        }
    }

    /// Recent history, most-recent-last, never more than the configured
    /// bound (or `limit`, whichever is smaller)
    pub async fn get_history(
        &self,
        user_id: &str,
        session_id: &str,
        limit: usize,
    ) -> Vec<ConversationTurn> {
        let log = self.session(user_id, session_id).await;
        let log = log.lock().await;

        let take = limit.min(self.policy.bound()).min(log.turns.len());
        log.turns
            .iter()
            .skip(log.turns.len() - take)
            .cloned()
            .collect()
    }

    /// Rolling summary of turns evicted under the summarizing policy
    pub async fn get_summary(&self, user_id: &str, session_id: &str) -> Option<String> {
        let log = self.session(user_id, session_id).await;
        let log = log.lock().await;
        log.summary.clone()
    }

    /// Full verbatim conversation for the management surface
    pub async fn get_conversation(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Vec<ConversationTurn> {
        let log = self.session(user_id, session_id).await;
        let log = log.lock().await;
        log.turns.iter().cloned().collect()
    }

    /// Case-insensitive substring search over one session's turns
    pub async fn search(
        &self,
        user_id: &str,
        session_id: &str,
        query: &str,
        max_results: usize,
    ) -> Vec<ConversationTurn> {
        let needle = query.to_lowercase();
        let log = self.session(user_id, session_id).await;
        let log = log.lock().await;

        log.turns
            .iter()
            .filter(|t| t.text.to_lowercase().contains(&needle))
            .take(max_results)
            .cloned()
            .collect()
    }

    /// Per-session statistics
    pub async fn stats(&self, user_id: &str, session_id: &str) -> MemoryStats {
        let log = self.session(user_id, session_id).await;
        let log = log.lock().await;

        MemoryStats {
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            has_memory: !log.turns.is_empty(),
            message_count: log.turns.len(),
        }
    }

    /// Store-wide statistics
    pub async fn global_stats(&self) -> GlobalMemoryStats {
        let sessions = self.sessions.read().await;
        let mut stats = GlobalMemoryStats::default();

        for log in sessions.values() {
            let log = log.lock().await;
            if !log.turns.is_empty() {
                stats.total_sessions += 1;
                stats.total_messages += log.turns.len();
            }
        }

        stats
    }

    /// Drop one session's history; returns whether anything was cleared
    pub async fn clear(&self, user_id: &str, session_id: &str) -> bool {
        let key = (user_id.to_string(), session_id.to_string());
        let mut sessions = self.sessions.write().await;

        if let Some(log) = sessions.remove(&key) {
            let cleared = !log.lock().await.turns.is_empty();
            debug!(user_id, session_id, "cleared session memory");
            return cleared;
        }
        false
    }
}

/// Extractive rolling summary: one clipped line per evicted turn
fn fold_into_summary(summary: &mut Option<String>, turn: &ConversationTurn) {
    const CLIP: usize = 80;

    let speaker = match turn.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    let clipped: String = turn.text.chars().take(CLIP).collect();
    let line = format!("{}: {}", speaker, clipped);

    match summary {
        Some(existing) => {
            existing.push_str("; ");
            existing.push_str(&line);
        }
        None => *summary = Some(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(user: &str, session: &str, role: Role, text: &str) -> ConversationTurn {
        ConversationTurn::new(user, session, role, text)
    }

    #[tokio::test]
    async fn test_append_and_history_order() {
        let store = MemoryStore::new(RetentionPolicy::BoundedWindow { max_turns: 10 });

        store.append(turn("u1", "s1", Role::User, "first")).await;
        store
            .append(turn("u1", "s1", Role::Assistant, "second"))
            .await;

        let history = store.get_history("u1", "s1", 10).await;
        assert_eq!(history.len(), 2);
        // Most-recent-last
        assert_eq!(history[0].text, "first");
        assert_eq!(history[1].text, "second");
    }

    #[tokio::test]
    async fn test_bounded_window_evicts_oldest() {
        let store = MemoryStore::new(RetentionPolicy::BoundedWindow { max_turns: 3 });

        for i in 0..5 {
            store
                .append(turn("u1", "s1", Role::User, &format!("msg {}", i)))
                .await;
        }

        let history = store.get_history("u1", "s1", 10).await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].text, "msg 2");
        assert_eq!(history[2].text, "msg 4");
    }

    #[tokio::test]
    async fn test_history_never_exceeds_bound() {
        let store = MemoryStore::new(RetentionPolicy::BoundedWindow { max_turns: 4 });

        for i in 0..10 {
            store
                .append(turn("u1", "s1", Role::User, &format!("msg {}", i)))
                .await;
        }

        // Asking for more than the bound still returns at most the bound
        assert_eq!(store.get_history("u1", "s1", 100).await.len(), 4);
        assert_eq!(store.get_history("u1", "s1", 2).await.len(), 2);
    }

    #[tokio::test]
    async fn test_summarizing_folds_evicted_turns() {
        let store = MemoryStore::new(RetentionPolicy::Summarizing { max_verbatim: 2 });

        store
            .append(turn("u1", "s1", Role::User, "I ran 5 km today"))
            .await;
        store
            .append(turn("u1", "s1", Role::Assistant, "Nice run!"))
            .await;
        store
            .append(turn("u1", "s1", Role::User, "plan my week"))
            .await;

        let summary = store.get_summary("u1", "s1").await.unwrap();
        assert!(summary.contains("I ran 5 km today"));

        // Verbatim window holds only the most recent turns
        let history = store.get_history("u1", "s1", 10).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text, "plan my week");
    }

    #[tokio::test]
    async fn test_cross_user_isolation() {
        let store = MemoryStore::new(RetentionPolicy::BoundedWindow { max_turns: 10 });

        store.append(turn("alice", "s1", Role::User, "alice msg")).await;
        store.append(turn("bob", "s1", Role::User, "bob msg")).await;

        let alice = store.get_history("alice", "s1", 10).await;
        assert_eq!(alice.len(), 1);
        assert!(alice.iter().all(|t| t.user_id == "alice"));

        let bob = store.get_history("bob", "s1", 10).await;
        assert!(bob.iter().all(|t| t.user_id == "bob"));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = MemoryStore::new(RetentionPolicy::BoundedWindow { max_turns: 10 });

        store.append(turn("u1", "morning", Role::User, "a")).await;
        store.append(turn("u1", "evening", Role::User, "b")).await;

        assert_eq!(store.get_history("u1", "morning", 10).await.len(), 1);
        assert_eq!(store.get_history("u1", "evening", 10).await.len(), 1);
    }

    #[tokio::test]
    async fn test_search() {
        let store = MemoryStore::new(RetentionPolicy::BoundedWindow { max_turns: 10 });

        store
            .append(turn("u1", "s1", Role::User, "I want to go running"))
            .await;
        store
            .append(turn("u1", "s1", Role::User, "How about swimming?"))
            .await;
        store
            .append(turn("u1", "s1", Role::User, "I prefer RUNNING"))
            .await;

        let hits = store.search("u1", "s1", "running", 10).await;
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_stats_and_clear() {
        let store = MemoryStore::new(RetentionPolicy::BoundedWindow { max_turns: 10 });

        store.append(turn("u1", "s1", Role::User, "hello")).await;
        store.append(turn("u1", "s1", Role::Assistant, "hi")).await;

        let stats = store.stats("u1", "s1").await;
        assert!(stats.has_memory);
        assert_eq!(stats.message_count, 2);

        assert!(store.clear("u1", "s1").await);

        let stats = store.stats("u1", "s1").await;
        assert!(!stats.has_memory);
        assert_eq!(stats.message_count, 0);
    }

    #[tokio::test]
    async fn test_global_stats() {
        let store = MemoryStore::new(RetentionPolicy::BoundedWindow { max_turns: 10 });

        store.append(turn("u1", "s1", Role::User, "a")).await;
        store.append(turn("u2", "s1", Role::User, "b")).await;
        store.append(turn("u2", "s1", Role::Assistant, "c")).await;

        let stats = store.global_stats().await;
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_messages, 3);
    }

    #[tokio::test]
    async fn test_concurrent_exchanges_never_interleave_pairs() {
        let store = Arc::new(MemoryStore::new(RetentionPolicy::BoundedWindow {
            max_turns: 100,
        }));

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .append_exchange(
                        turn("u1", "s1", Role::User, &format!("question {}", i)),
                        turn("u1", "s1", Role::Assistant, &format!("answer {}", i)),
                    )
                    .await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let history = store.get_history("u1", "s1", 100).await;
        assert_eq!(history.len(), 40);

        // Every question is immediately followed by its own answer.
        for pair in history.chunks(2) {
            let q = pair[0].text.strip_prefix("question ").unwrap();
            let a = pair[1].text.strip_prefix("answer ").unwrap();
            assert_eq!(q, a);
        }
    }

    #[tokio::test]
    async fn test_exchange_append_applies_retention() {
        let store = MemoryStore::new(RetentionPolicy::Summarizing { max_verbatim: 2 });

        store
            .append_exchange(
                turn("u1", "s1", Role::User, "I ran 5 km today"),
                turn("u1", "s1", Role::Assistant, "Logged it"),
            )
            .await;
        store
            .append_exchange(
                turn("u1", "s1", Role::User, "plan my week"),
                turn("u1", "s1", Role::Assistant, "Here's a plan"),
            )
            .await;

        let history = store.get_history("u1", "s1", 10).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "plan my week");

        let summary = store.get_summary("u1", "s1").await.unwrap();
        assert!(summary.contains("I ran 5 km today"));
    }

    #[tokio::test]
    async fn test_concurrent_same_session_appends_all_land() {
        let store = Arc::new(MemoryStore::new(RetentionPolicy::BoundedWindow {
            max_turns: 100,
        }));

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .append(turn("u1", "s1", Role::User, &format!("msg {}", i)))
                    .await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.get_history("u1", "s1", 100).await.len(), 20);
    }
}
