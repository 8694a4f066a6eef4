//! Coach agent
//!
//! Produces advisory/motivational text through the Model Gateway,
//! optionally informed by upstream Logger output. Degrades gracefully to
//! generic encouragement when upstream data is missing or the gateway is
//! unavailable - a coaching task never fails outright.

use crate::agents::CapabilityAgent;
use crate::gateway::{GenerateOutcome, GenerateParams, ModelGateway};
use crate::types::{AgentKind, AgentResult, AgentTask, IntentCategory, TaskInput};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Agent responsible for coaching advice, planning, and motivation
pub struct CoachAgent {
    gateway: Arc<ModelGateway>,
}

impl CoachAgent {
    pub fn new(gateway: Arc<ModelGateway>) -> Self {
        Self { gateway }
    }

    fn build_prompt(input: &TaskInput) -> String {
        let mut prompt = String::from(
            "You are FitBuddy, an encouraging fitness coach. \
             Reply in 2-4 conversational sentences with actionable advice.\n\n",
        );

        prompt.push_str(&format!("User request: \"{}\"\n", input.message));

        if input.missing_data {
            prompt.push_str(
                "Recent activity data is unavailable; give general, \
                 data-free advice and say the history could not be loaded.\n",
            );
        } else if let Some(upstream) = &input.upstream {
            prompt.push_str(&format!("Recent activity data:\n{}\n", upstream));
        }

        match input.category {
            IntentCategory::Plan => {
                prompt.push_str("Create a realistic, short workout plan for this user.\n");
            }
            IntentCategory::Analyze => {
                prompt.push_str(
                    "Analyze the progress shown in the data and suggest concrete improvements.\n",
                );
            }
            IntentCategory::Motivate => {
                prompt.push_str("Give an energetic motivational push.\n");
            }
            _ => {}
        }

        prompt
    }

    /// Rule-based reply used when the gateway is unavailable
    fn fallback_text(category: IntentCategory) -> &'static str {
        match category {
            IntentCategory::Plan => {
                "Here's a simple starting plan: three sessions this week, \
                 30 minutes each, alternating easy cardio and bodyweight strength. \
                 Adjust the pace so you can still hold a conversation."
            }
            IntentCategory::Analyze => {
                "I couldn't run a detailed analysis right now, but the habit that \
                 moves the needle most is consistency. Keep logging your sessions \
                 and we'll dig into the numbers next time."
            }
            _ => {
                "Keep showing up - consistency beats intensity. Even a short \
                 session today keeps the streak alive. You've got this!"
            }
        }
    }
}

#[async_trait]
impl CapabilityAgent for CoachAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Coach
    }

    async fn handle(&self, task: AgentTask) -> AgentResult {
        let input = &task.input;
        let prompt = Self::build_prompt(input);

        match self.gateway.generate(&prompt, &GenerateParams::default()).await {
            GenerateOutcome::Text(text) if !text.trim().is_empty() => {
                let result = AgentResult::ok(AgentKind::Coach, text.trim().to_string());
                if input.missing_data {
                    result.degraded()
                } else {
                    result
                }
            }
            GenerateOutcome::Text(_) | GenerateOutcome::Unavailable { .. } => {
                debug!("gateway unavailable, using generic encouragement");
                AgentResult::ok(AgentKind::Coach, Self::fallback_text(input.category))
                    .degraded()
            }
        }
    }
}
