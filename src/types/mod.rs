//! Core domain types
//!
//! Data model shared across the orchestrator, agents, and memory store.

pub mod intent;
pub mod messages;
pub mod plan;

pub use intent::{IntentCategory, IntentClassification};
pub use messages::{ConversationTurn, Message, Role};
pub use plan::{AgentKind, AgentResult, AgentTask, ExecutionPlan, TaskId, TaskInput};
