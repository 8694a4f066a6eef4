//! Execution planning
//!
//! Deterministic mapping from intent category to agent set and ordering.
//! The only multi-agent path is Analyze: Logger produces the data, Coach
//! consumes it, with a hard dependency edge between the two.

use crate::types::{
    AgentKind, AgentTask, ExecutionPlan, IntentCategory, IntentClassification, TaskInput,
};

/// Resolve an execution plan for one classified request.
///
/// Dispatch table:
/// - LogActivity, RetrieveData -> Logger only
/// - Plan, Motivate            -> Coach only
/// - Analyze                   -> Logger then Coach (dependency edge)
/// - Unknown                   -> empty plan (direct help reply)
pub fn plan(
    classification: &IntentClassification,
    user_id: &str,
    message: &str,
) -> ExecutionPlan {
    let input = |missing_data: bool| TaskInput {
        user_id: user_id.to_string(),
        message: message.to_string(),
        category: classification.category,
        extracted: classification.extracted.clone(),
        upstream: None,
        missing_data,
    };

    let tasks = match classification.category {
        IntentCategory::LogActivity | IntentCategory::RetrieveData => vec![AgentTask {
            id: 0,
            agent: AgentKind::Logger,
            depends_on: None,
            input: input(false),
        }],
        IntentCategory::Plan | IntentCategory::Motivate => vec![AgentTask {
            id: 0,
            agent: AgentKind::Coach,
            depends_on: None,
            input: input(false),
        }],
        IntentCategory::Analyze => vec![
            AgentTask {
                id: 0,
                agent: AgentKind::Logger,
                depends_on: None,
                input: input(false),
            },
            AgentTask {
                id: 1,
                agent: AgentKind::Coach,
                depends_on: Some(0),
                input: input(false),
            },
        ],
        IntentCategory::Unknown => return ExecutionPlan::empty(),
    };

    ExecutionPlan { tasks }
}
