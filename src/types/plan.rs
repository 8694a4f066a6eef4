//! Execution plan and agent result types
//!
//! An `ExecutionPlan` is an ordered, dependency-aware list of agent
//! invocations for one request. A task with a dependency may not start
//! before its dependency's output is available; tasks without mutual
//! dependency may run concurrently.

use crate::types::intent::IntentCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of a task within one execution plan
pub type TaskId = u32;

/// The capability agents a task can be dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Logger,
    Coach,
}

impl AgentKind {
    /// Wire name used in reply logs
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Logger => "logger",
            AgentKind::Coach => "coach",
        }
    }
}

/// Input handed to an agent for one task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInput {
    pub user_id: String,
    /// Original user message text
    pub message: String,
    /// Category the task was planned under
    pub category: IntentCategory,
    /// Fields the classifier extracted from the message
    #[serde(default)]
    pub extracted: HashMap<String, String>,
    /// Output of the dependency task, when one exists and succeeded
    #[serde(default)]
    pub upstream: Option<String>,
    /// Set when a dependency failed; the agent runs in degraded mode
    #[serde(default)]
    pub missing_data: bool,
}

/// One planned agent invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTask {
    pub id: TaskId,
    pub agent: AgentKind,
    pub depends_on: Option<TaskId>,
    pub input: TaskInput,
}

/// Ordered, dependency-aware list of agent invocations for one request
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    pub tasks: Vec<AgentTask>,
}

impl ExecutionPlan {
    /// Plan with no agent invocations (help/fallback reply)
    pub fn empty() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks with no dependency, runnable immediately and concurrently
    pub fn independent_tasks(&self) -> Vec<&AgentTask> {
        self.tasks.iter().filter(|t| t.depends_on.is_none()).collect()
    }

    /// Tasks that wait on another task's output
    pub fn dependent_tasks(&self) -> Vec<&AgentTask> {
        self.tasks.iter().filter(|t| t.depends_on.is_some()).collect()
    }
}

/// Outcome of one agent invocation, owned by the orchestrator for the
/// duration of one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent: AgentKind,
    pub success: bool,
    /// User-facing text produced by the agent (empty on failure)
    pub payload: String,
    /// Structured facts, when the agent produced any (e.g. normalized
    /// activity fields from the Logger)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    /// True when the agent answered best-effort without its usual inputs
    #[serde(default)]
    pub degraded: bool,
    /// Internal error description; never surfaced to the end user
    #[serde(default)]
    pub error: Option<String>,
}

impl AgentResult {
    /// Successful result with a text payload
    pub fn ok(agent: AgentKind, payload: impl Into<String>) -> Self {
        Self {
            agent,
            success: true,
            payload: payload.into(),
            data: None,
            degraded: false,
            error: None,
        }
    }

    /// Failed result with an internal error description
    pub fn failed(agent: AgentKind, error: impl Into<String>) -> Self {
        Self {
            agent,
            success: false,
            payload: String::new(),
            data: None,
            degraded: false,
            error: Some(error.into()),
        }
    }

    /// Attach structured data
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Mark this result as produced in degraded mode
    pub fn degraded(mut self) -> Self {
        self.degraded = true;
        self
    }
}
