//! Intent classification
//!
//! Two-stage classifier: a cheap, deterministic keyword matcher runs
//! first, and the Model Gateway is consulted only when the matcher's
//! confidence falls below the configured threshold. The gateway path is
//! best-effort - on an unavailable provider or an unparseable reply the
//! pattern result stands, so classification itself can never fail a
//! request.

use crate::gateway::{GenerateOutcome, GenerateParams, ModelGateway};
use crate::types::{IntentCategory, IntentClassification, Message};
use std::sync::Arc;
use tracing::{debug, warn};

/// Keyword cues per category. Scoring counts distinct cue hits, so a
/// message with more matching cues reports higher confidence.
const LOG_CUES: &[&str] = &[
    "i ran", "i walked", "i did", "i swam", "i cycled", "i biked", "i lifted",
    "log", "record", "track", "completed", "finished", "just did",
];
const RETRIEVE_CUES: &[&str] = &[
    "show", "what did i", "my stats", "my history", "my activities",
    "how many", "how much", "last week", "this week", "summary",
];
const PLAN_CUES: &[&str] = &[
    "plan", "routine", "schedule", "program", "what should i do",
    "suggest a workout", "training plan",
];
const ANALYZE_CUES: &[&str] = &[
    "analyze", "analyse", "progress", "trend", "improve", "improvement",
    "how am i doing", "compare", "insight",
];
const MOTIVATE_CUES: &[&str] = &[
    "motivate", "motivation", "encourage", "tired", "give up", "lazy",
    "don't feel like", "pump me up", "inspire",
];

const ACTIVITY_WORDS: &[(&str, &str)] = &[
    ("ran", "running"),
    ("run", "running"),
    ("running", "running"),
    ("jogged", "running"),
    ("walked", "walking"),
    ("walk", "walking"),
    ("swam", "swimming"),
    ("swim", "swimming"),
    ("cycled", "cycling"),
    ("biked", "cycling"),
    ("bike", "cycling"),
    ("lifted", "strength"),
    ("yoga", "yoga"),
];

/// Classifies inbound messages into task categories
pub struct IntentClassifier {
    gateway: Arc<ModelGateway>,
    /// Pattern confidence below which the gateway is consulted
    escalation_threshold: f64,
}

impl IntentClassifier {
    pub fn new(gateway: Arc<ModelGateway>, escalation_threshold: f64) -> Self {
        Self {
            gateway,
            escalation_threshold,
        }
    }

    /// Classify a message, escalating to the Model Gateway when the
    /// pattern matcher is unsure.
    ///
    /// # Arguments
    /// * `message` - Non-empty user message text
    /// * `history` - Recent conversation turns, most-recent-last
    pub async fn classify(
        &self,
        message: &str,
        history: &[Message],
    ) -> IntentClassification {
        let pattern = Self::classify_by_patterns(message);

        if pattern.confidence >= self.escalation_threshold
            && pattern.category != IntentCategory::Unknown
        {
            return pattern;
        }

        debug!(
            confidence = pattern.confidence,
            category = pattern.category.as_str(),
            "pattern confidence below threshold, consulting model"
        );

        match self.classify_by_model(message, history).await {
            Some(assisted) => assisted,
            None => pattern,
        }
    }

    /// Deterministic keyword scoring. Confidence scales with the number
    /// of distinct cue hits for the winning category; simultaneous data
    /// and advice cues resolve to the composite Analyze category.
    pub fn classify_by_patterns(message: &str) -> IntentClassification {
        let text = message.to_lowercase();

        let scores = [
            (IntentCategory::LogActivity, cue_hits(&text, LOG_CUES)),
            (IntentCategory::RetrieveData, cue_hits(&text, RETRIEVE_CUES)),
            (IntentCategory::Plan, cue_hits(&text, PLAN_CUES)),
            (IntentCategory::Analyze, cue_hits(&text, ANALYZE_CUES)),
            (IntentCategory::Motivate, cue_hits(&text, MOTIVATE_CUES)),
        ];

        let data_cues = scores[0].1 + scores[1].1;
        let advice_cues = scores[2].1 + scores[3].1 + scores[4].1;

        // A message carrying both data cues and advice cues needs the
        // two-agent path: data first, then the coach consumes it.
        if scores[3].1 > 0 || (data_cues > 0 && advice_cues > 0) {
            let hits = scores[3].1.max(1) + data_cues.min(1);
            let mut classification =
                IntentClassification::pattern(IntentCategory::Analyze, 0.5 + 0.2 * hits as f64);
            extract_fields(&text, &mut classification);
            return classification;
        }

        let best = scores
            .iter()
            .max_by_key(|(_, hits)| *hits)
            .copied()
            .unwrap_or((IntentCategory::Unknown, 0));

        if best.1 == 0 {
            return IntentClassification::pattern(IntentCategory::Unknown, 0.0);
        }

        let mut classification =
            IntentClassification::pattern(best.0, 0.5 + 0.2 * best.1 as f64);
        extract_fields(&text, &mut classification);
        classification
    }

    /// Model-assisted refinement. Returns `None` when the gateway is
    /// unavailable or its reply does not parse, leaving the pattern
    /// result in force.
    async fn classify_by_model(
        &self,
        message: &str,
        history: &[Message],
    ) -> Option<IntentClassification> {
        let prompt = Self::build_prompt(message, history);

        let raw = match self
            .gateway
            .generate(&prompt, &GenerateParams::deterministic())
            .await
        {
            GenerateOutcome::Text(text) => text,
            GenerateOutcome::Unavailable { reason } => {
                warn!(reason = %reason, "model-assisted classification unavailable");
                return None;
            }
        };

        match Self::parse_model_reply(&raw) {
            Some(classification) => Some(classification.assisted()),
            None => {
                warn!("model classification reply did not parse, keeping pattern result");
                None
            }
        }
    }

    fn build_prompt(message: &str, history: &[Message]) -> String {
        let mut prompt = String::from(
            "Classify the fitness chatbot message into exactly one intent.\n\
             Intents: log_activity, retrieve_data, plan, analyze, motivate, unknown.\n\
             Respond with ONLY a JSON object:\n\
             {\"intent\": \"...\", \"confidence\": 0.0, \"extracted_info\": {}}\n\n",
        );

        if !history.is_empty() {
            prompt.push_str("Recent conversation:\n");
            for turn in history {
                prompt.push_str(&format!("- {}\n", turn.text));
            }
            prompt.push('\n');
        }

        prompt.push_str(&format!("Message: \"{}\"", message));
        prompt
    }

    /// Parse the model's JSON reply, tolerating surrounding prose and
    /// code fences.
    fn parse_model_reply(raw: &str) -> Option<IntentClassification> {
        let start = raw.find('{')?;
        let end = raw.rfind('}')?;
        let value: serde_json::Value = serde_json::from_str(&raw[start..=end]).ok()?;

        let category = match value.get("intent")?.as_str()? {
            "log_activity" => IntentCategory::LogActivity,
            "retrieve_data" => IntentCategory::RetrieveData,
            "plan" => IntentCategory::Plan,
            "analyze" => IntentCategory::Analyze,
            "motivate" => IntentCategory::Motivate,
            "unknown" => IntentCategory::Unknown,
            _ => return None,
        };

        let confidence = value
            .get("confidence")
            .and_then(|c| c.as_f64())
            .unwrap_or(0.75);

        let mut classification = IntentClassification::pattern(category, confidence);
        if let Some(info) = value.get("extracted_info").and_then(|i| i.as_object()) {
            for (key, val) in info {
                let text = match val {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                classification = classification.with_field(key.clone(), text);
            }
        }

        Some(classification)
    }
}

fn cue_hits(text: &str, cues: &[&str]) -> usize {
    cues.iter().filter(|cue| text.contains(*cue)).count()
}

/// Pull lightweight fields out of the lowercased message text
fn extract_fields(text: &str, classification: &mut IntentClassification) {
    for (word, canonical) in ACTIVITY_WORDS {
        let hit = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .any(|w| w == *word);
        if hit {
            classification
                .extracted
                .insert("activity".to_string(), canonical.to_string());
            break;
        }
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    for (i, token) in tokens.iter().enumerate() {
        let cleaned = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '.');
        if cleaned.parse::<f64>().is_ok() {
            if let Some(next) = tokens.get(i + 1) {
                let unit = next.trim_matches(|c: char| !c.is_alphanumeric());
                match unit {
                    "km" | "kilometers" | "kilometres" | "miles" | "mi" | "m" | "meters" => {
                        classification
                            .extracted
                            .insert("distance".to_string(), format!("{} {}", cleaned, unit));
                    }
                    "min" | "mins" | "minutes" | "hour" | "hours" | "h" => {
                        classification
                            .extracted
                            .insert("duration".to_string(), format!("{} {}", cleaned, unit));
                    }
                    _ => {}
                }
            }
        }
    }
}
