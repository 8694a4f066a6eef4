//! Logger agent
//!
//! Parses structured activity facts out of free text for logging tasks,
//! or issues a read query for retrieval tasks. The actual remote write/read
//! is delegated to the MCP-style service collaborator; units are normalized
//! (distance to kilometers, duration to minutes) before persisting.

use crate::agents::CapabilityAgent;
use crate::mcp::{RemoteService, ToolDescriptor};
use crate::types::{AgentKind, AgentResult, AgentTask, IntentCategory, TaskInput};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Structured activity facts parsed from free text, units normalized
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityFacts {
    pub activity: Option<String>,
    pub distance_km: Option<f64>,
    pub duration_min: Option<f64>,
    pub location: Option<String>,
}

impl ActivityFacts {
    pub fn is_empty(&self) -> bool {
        self.activity.is_none()
            && self.distance_km.is_none()
            && self.duration_min.is_none()
            && self.location.is_none()
    }
}

/// Agent responsible for writing and reading activity facts through the
/// remote tracking service
pub struct LoggerAgent {
    remote: Arc<dyn RemoteService>,
}

impl LoggerAgent {
    pub fn new(remote: Arc<dyn RemoteService>) -> Self {
        Self { remote }
    }

    /// Parse activity facts out of free text
    pub fn parse_facts(text: &str) -> ActivityFacts {
        let lower = text.to_lowercase();
        let mut facts = ActivityFacts {
            activity: detect_activity(&lower),
            location: detect_location(&lower),
            ..ActivityFacts::default()
        };

        for (value, unit) in extract_quantities(&lower) {
            match unit {
                Unit::Kilometers => facts.distance_km = Some(value),
                Unit::Miles => facts.distance_km = Some(round2(value * 1.60934)),
                Unit::Meters => facts.distance_km = Some(round2(value / 1000.0)),
                Unit::Minutes => facts.duration_min = Some(value),
                Unit::Hours => facts.duration_min = Some(value * 60.0),
                Unit::Seconds => facts.duration_min = Some(round2(value / 60.0)),
            }
        }

        facts
    }

    async fn log_activity(&self, input: &TaskInput) -> AgentResult {
        let facts = Self::parse_facts(&input.message);

        if facts.activity.is_none() && facts.distance_km.is_none() && facts.duration_min.is_none()
        {
            return AgentResult::failed(
                AgentKind::Logger,
                "no activity facts found in message; nothing to log",
            );
        }

        let tools = match self.remote.list_tools().await {
            Ok(tools) => tools,
            Err(e) => return AgentResult::failed(AgentKind::Logger, e.to_string()),
        };

        let Some(tool) = find_tool(&tools, &["log"]) else {
            // Never fabricate a logged record when the service exposes no
            // matching capability
            return AgentResult::failed(
                AgentKind::Logger,
                "remote service exposes no capability matching activity logging",
            );
        };

        let arguments = json!({
            "user_id": input.user_id,
            "activity": facts.activity.clone().unwrap_or_else(|| "other".to_string()),
            "distance_km": facts.distance_km,
            "duration_min": facts.duration_min,
            "location": facts.location,
        });

        debug!(tool = %tool.name, "logging activity via remote service");

        match self.remote.call_tool(&tool.name, arguments).await {
            Ok(_) => {
                let payload = confirmation_text(&facts);
                AgentResult::ok(AgentKind::Logger, payload)
                    .with_data(serde_json::to_value(&facts).unwrap_or_default())
            }
            Err(e) => AgentResult::failed(AgentKind::Logger, e.to_string()),
        }
    }

    async fn retrieve_data(&self, input: &TaskInput) -> AgentResult {
        let tools = match self.remote.list_tools().await {
            Ok(tools) => tools,
            Err(e) => return AgentResult::failed(AgentKind::Logger, e.to_string()),
        };

        let Some(tool) = find_tool(&tools, &["stats", "activities", "history"]) else {
            return AgentResult::failed(
                AgentKind::Logger,
                "remote service exposes no capability matching data retrieval",
            );
        };

        debug!(tool = %tool.name, "retrieving activity data via remote service");

        match self
            .remote
            .call_tool(&tool.name, json!({ "user_id": input.user_id }))
            .await
        {
            Ok(content) if content.trim().is_empty() => AgentResult::ok(
                AgentKind::Logger,
                "No activities logged yet.".to_string(),
            ),
            Ok(content) => AgentResult::ok(AgentKind::Logger, content),
            Err(e) => AgentResult::failed(AgentKind::Logger, e.to_string()),
        }
    }
}

#[async_trait]
impl CapabilityAgent for LoggerAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Logger
    }

    async fn handle(&self, task: AgentTask) -> AgentResult {
        match task.input.category {
            IntentCategory::LogActivity => self.log_activity(&task.input).await,
            // Retrieval also covers the data-producing leg of an Analyze plan
            _ => self.retrieve_data(&task.input).await,
        }
    }
}

/// Pick the first tool whose name contains any of the given markers
fn find_tool<'a>(tools: &'a [ToolDescriptor], markers: &[&str]) -> Option<&'a ToolDescriptor> {
    tools.iter().find(|t| {
        let name = t.name.to_lowercase();
        markers.iter().any(|m| name.contains(m))
    })
}

fn confirmation_text(facts: &ActivityFacts) -> String {
    let activity = facts.activity.as_deref().unwrap_or("activity");
    let mut parts = vec![format!("Logged {}", activity)];

    if let Some(km) = facts.distance_km {
        parts.push(format!("{} km", trim_float(km)));
    }
    if let Some(min) = facts.duration_min {
        parts.push(format!("{} min", trim_float(min)));
    }
    if let Some(loc) = &facts.location {
        parts.push(format!("at the {}", loc));
    }

    format!("{}.", parts.join(", "))
}

fn trim_float(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{:.2}", v)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Kilometers,
    Miles,
    Meters,
    Minutes,
    Hours,
    Seconds,
}

fn unit_from(token: &str) -> Option<Unit> {
    match token {
        "km" | "kilometer" | "kilometers" => Some(Unit::Kilometers),
        "mi" | "mile" | "miles" => Some(Unit::Miles),
        "m" | "meter" | "meters" => Some(Unit::Meters),
        "min" | "mins" | "minute" | "minutes" => Some(Unit::Minutes),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(Unit::Hours),
        "s" | "sec" | "secs" | "second" | "seconds" => Some(Unit::Seconds),
        _ => None,
    }
}

/// Extract (value, unit) pairs, handling both "5 km" and "5km" shapes
fn extract_quantities(lower: &str) -> Vec<(f64, Unit)> {
    // Trailing '.' is punctuation; inner '.' is a decimal point
    let tokens: Vec<&str> = lower
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| c == ',' || c == '!' || c == '?')
                .trim_end_matches('.')
        })
        .filter(|t| !t.is_empty())
        .collect();

    let mut out = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];

        if let Ok(value) = token.parse::<f64>() {
            // Unit is the next token: "5 km"
            if i + 1 < tokens.len() {
                if let Some(unit) = unit_from(tokens[i + 1]) {
                    out.push((value, unit));
                    i += 2;
                    continue;
                }
            }
        } else {
            // Joined form: "5km"
            let digits: String = token
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            if !digits.is_empty() {
                let suffix = &token[digits.len()..];
                if let (Ok(value), Some(unit)) = (digits.parse::<f64>(), unit_from(suffix)) {
                    out.push((value, unit));
                }
            }
        }
        i += 1;
    }

    out
}

fn detect_activity(lower: &str) -> Option<String> {
    const ACTIVITIES: &[(&str, &str)] = &[
        ("ran", "running"),
        ("running", "running"),
        ("run", "running"),
        ("jog", "running"),
        ("cycled", "cycling"),
        ("cycling", "cycling"),
        ("biked", "cycling"),
        ("bike", "cycling"),
        ("swam", "swimming"),
        ("swimming", "swimming"),
        ("swim", "swimming"),
        ("walked", "walking"),
        ("walking", "walking"),
        ("walk", "walking"),
        ("yoga", "yoga"),
        ("pushups", "strength_training"),
        ("push-ups", "strength_training"),
        ("lifted", "strength_training"),
        ("weights", "strength_training"),
        ("workout", "other"),
    ];

    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .collect();

    for (cue, normalized) in ACTIVITIES {
        if words.contains(cue) {
            return Some((*normalized).to_string());
        }
    }
    None
}

fn detect_location(lower: &str) -> Option<String> {
    for marker in ["at the ", "in the "] {
        if let Some(pos) = lower.find(marker) {
            let rest = &lower[pos + marker.len()..];
            let location: String = rest
                .split(|c: char| c == ',' || c == '.' || c == '!' || c == '?')
                .next()
                .unwrap_or("")
                .split_whitespace()
                .take(3)
                .collect::<Vec<_>>()
                .join(" ");
            if !location.is_empty() {
                return Some(location);
            }
        }
    }
    None
}
