//! Plan execution
//!
//! Fan-out/fan-in over the plan's tasks: independent tasks run
//! concurrently and are joined; dependent tasks run after their
//! dependency resolves, receiving its payload (or a missing-data flag
//! when it failed). The whole stage runs against a shared deadline -
//! tasks that cannot start or finish in time resolve as failed rather
//! than holding the request open.

use crate::agents::CapabilityAgent;
use crate::api::AgentLog;
use crate::types::{AgentKind, AgentResult, AgentTask, ExecutionPlan, IntentCategory, TaskId};
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Agents available for dispatch, keyed by kind
pub type AgentRegistry = HashMap<AgentKind, Arc<dyn CapabilityAgent>>;

/// Execute every task in the plan, returning results in plan order.
///
/// A failed task never aborts independent siblings. A failed dependency
/// puts its dependents into degraded mode instead of skipping them.
/// Tasks unresolved when `deadline` expires resolve as failed.
pub async fn execute(
    agents: &AgentRegistry,
    plan: &ExecutionPlan,
    deadline: Duration,
) -> Vec<AgentResult> {
    let cutoff = Instant::now() + deadline;
    let mut by_id: HashMap<TaskId, AgentResult> = HashMap::new();

    // Fan out the independent wave.
    let independent = plan.independent_tasks();
    let wave = independent
        .iter()
        .map(|task| run_task(agents, (*task).clone(), cutoff));
    for (id, result) in join_all(wave).await {
        by_id.insert(id, result);
    }

    // Dependents run after their dependency, in plan order.
    for task in plan.dependent_tasks() {
        let mut task = (*task).clone();
        if let Some(dep_id) = task.depends_on {
            match by_id.get(&dep_id) {
                Some(dep) if dep.success => {
                    task.input.upstream = Some(dep.payload.clone());
                }
                _ => {
                    debug!(
                        task = task.id,
                        dependency = dep_id,
                        "dependency failed, running task in degraded mode"
                    );
                    task.input.missing_data = true;
                }
            }
        }

        let (id, result) = run_task(agents, task, cutoff).await;
        by_id.insert(id, result);
    }

    // Results in plan order.
    plan.tasks
        .iter()
        .map(|task| {
            by_id.remove(&task.id).unwrap_or_else(|| {
                AgentResult::failed(task.agent, "task was never scheduled")
            })
        })
        .collect()
}

/// Run one task against the remaining deadline budget
async fn run_task(
    agents: &AgentRegistry,
    task: AgentTask,
    cutoff: Instant,
) -> (TaskId, AgentResult) {
    let id = task.id;
    let kind = task.agent;

    let agent = match agents.get(&kind) {
        Some(agent) => Arc::clone(agent),
        None => {
            warn!(agent = kind.as_str(), "no agent registered for task");
            return (id, AgentResult::failed(kind, "no agent registered"));
        }
    };

    let remaining = cutoff.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        return (
            id,
            AgentResult::failed(kind, "request deadline exceeded before task started"),
        );
    }

    match tokio::time::timeout(remaining, agent.handle(task)).await {
        Ok(result) => (id, result),
        Err(_) => {
            warn!(task = id, agent = kind.as_str(), "task exceeded request deadline");
            (
                id,
                AgentResult::failed(kind, "request deadline exceeded"),
            )
        }
    }
}

/// Client-facing log lines for one executed plan. Failure details stay
/// generic; internal error text never leaves the process.
pub fn build_logs(plan: &ExecutionPlan, results: &[AgentResult]) -> Vec<AgentLog> {
    plan.tasks
        .iter()
        .zip(results.iter())
        .map(|(task, result)| {
            let action = match (task.agent, task.input.category) {
                (AgentKind::Logger, IntentCategory::LogActivity) => "log_activity",
                (AgentKind::Logger, _) => "retrieve_data",
                (AgentKind::Coach, _) => "coach_advice",
            };

            let details = if !result.success {
                "task did not complete".to_string()
            } else if result.degraded {
                "completed without full data".to_string()
            } else {
                "completed".to_string()
            };

            AgentLog {
                agent: task.agent.as_str().to_string(),
                action: action.to_string(),
                details,
            }
        })
        .collect()
}
