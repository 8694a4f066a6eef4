//! Intent classification types
//!
//! The classification is derived per message and owned by the orchestrator
//! for the lifetime of one request; it is never persisted beyond the turn
//! that produced it, though it is surfaced in reply metadata.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Task categories an inbound message can be classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    /// User wants to record a fitness activity
    LogActivity,
    /// User wants to read back logged data (stats, history)
    RetrieveData,
    /// User wants a workout plan or routine
    Plan,
    /// User wants data-driven analysis of their progress (two-agent path)
    Analyze,
    /// User wants motivation or encouragement
    Motivate,
    /// Message does not fit any category
    Unknown,
}

impl IntentCategory {
    /// Wire name used in reply metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentCategory::LogActivity => "log_activity",
            IntentCategory::RetrieveData => "retrieve_data",
            IntentCategory::Plan => "plan",
            IntentCategory::Analyze => "analyze",
            IntentCategory::Motivate => "motivate",
            IntentCategory::Unknown => "unknown",
        }
    }
}

/// Result of classifying one inbound message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentClassification {
    pub category: IntentCategory,
    /// Probability in [0, 1]
    pub confidence: f64,
    /// Fields pulled out of the message text (activity type, distance, ...)
    #[serde(default)]
    pub extracted: HashMap<String, String>,
    /// True when the Model Gateway refined the pattern-match result
    #[serde(default)]
    pub model_assisted: bool,
}

impl IntentClassification {
    /// Create a pattern-matched classification, clamping confidence to [0, 1]
    pub fn pattern(category: IntentCategory, confidence: f64) -> Self {
        Self {
            category,
            confidence: confidence.clamp(0.0, 1.0),
            extracted: HashMap::new(),
            model_assisted: false,
        }
    }

    /// Mark this classification as model-assisted
    pub fn assisted(mut self) -> Self {
        self.model_assisted = true;
        self
    }

    /// Attach an extracted field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extracted.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamped() {
        let c = IntentClassification::pattern(IntentCategory::LogActivity, 1.4);
        assert_eq!(c.confidence, 1.0);

        let c = IntentClassification::pattern(IntentCategory::Unknown, -0.2);
        assert_eq!(c.confidence, 0.0);
    }

    #[test]
    fn test_category_wire_names() {
        assert_eq!(
            serde_json::to_string(&IntentCategory::LogActivity).unwrap(),
            "\"log_activity\""
        );
        assert_eq!(IntentCategory::Analyze.as_str(), "analyze");
    }

    #[test]
    fn test_assisted_flag() {
        let c = IntentClassification::pattern(IntentCategory::Plan, 0.8).assisted();
        assert!(c.model_assisted);
    }
}
