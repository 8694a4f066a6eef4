//! Reply synthesis
//!
//! Merges ordered agent results into one user-facing reply. Synthesis is
//! deterministic - the same results always produce the same text - so the
//! streaming and non-streaming paths cannot drift apart. Internal error
//! text never appears in the output.

use crate::types::AgentResult;

/// Fixed reply for messages no agent can act on
pub const HELP_MESSAGE: &str = "I'm not sure how to help with that. \
I can log workouts (\"I ran 5 km in 30 minutes\"), show your activity \
history, build a training plan, analyze your progress, or just cheer \
you on. What would you like to do?";

/// Apology used when every planned task failed
const ALL_FAILED_MESSAGE: &str = "Sorry, I couldn't complete that right \
now - my tools aren't responding. Please try again in a moment.";

/// Suffix appended when some, but not all, tasks failed
const PARTIAL_SUFFIX: &str = "(Some of my tools didn't respond, so this \
answer may be incomplete.)";

/// Merge agent results into one coherent reply.
///
/// An empty result set yields the fixed help message. Successful payloads
/// are joined in task order; any failure downgrades the reply to an
/// apologetic or partial form, never to internal error text and never to
/// an empty string.
pub fn synthesize(results: &[AgentResult]) -> String {
    if results.is_empty() {
        return HELP_MESSAGE.to_string();
    }

    let successes: Vec<&str> = results
        .iter()
        .filter(|r| r.success && !r.payload.trim().is_empty())
        .map(|r| r.payload.trim())
        .collect();

    if successes.is_empty() {
        return ALL_FAILED_MESSAGE.to_string();
    }

    let mut reply = successes.join("\n\n");

    let any_failed = results.iter().any(|r| !r.success);
    if any_failed {
        reply.push_str("\n\n");
        reply.push_str(PARTIAL_SUFFIX);
    }

    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AgentKind;

    #[test]
    fn test_empty_results_yield_help_message() {
        assert_eq!(synthesize(&[]), HELP_MESSAGE);
    }

    #[test]
    fn test_successes_joined_in_order() {
        let results = vec![
            AgentResult::ok(AgentKind::Logger, "You logged 3 runs this week."),
            AgentResult::ok(AgentKind::Coach, "Add one interval session."),
        ];

        let reply = synthesize(&results);
        let logger_pos = reply.find("3 runs").unwrap();
        let coach_pos = reply.find("interval").unwrap();
        assert!(logger_pos < coach_pos);
    }

    #[test]
    fn test_partial_failure_is_apologetic_not_internal() {
        let results = vec![
            AgentResult::failed(AgentKind::Logger, "connection refused (os error 111)"),
            AgentResult::ok(AgentKind::Coach, "Keep at it!"),
        ];

        let reply = synthesize(&results);
        assert!(reply.contains("Keep at it!"));
        assert!(reply.contains("incomplete"));
        assert!(!reply.contains("connection refused"));
        assert!(!reply.contains("os error"));
    }

    #[test]
    fn test_all_failed_still_intelligible() {
        let results = vec![
            AgentResult::failed(AgentKind::Logger, "timeout"),
            AgentResult::failed(AgentKind::Coach, "timeout"),
        ];

        let reply = synthesize(&results);
        assert!(!reply.is_empty());
        assert!(!reply.contains("timeout"));
        assert!(reply.to_lowercase().contains("sorry"));
    }

    #[test]
    fn test_deterministic() {
        let results = vec![AgentResult::ok(AgentKind::Coach, "Go for it.")];
        assert_eq!(synthesize(&results), synthesize(&results));
    }

    #[test]
    fn test_never_empty() {
        // A success with an empty payload must not produce a blank reply.
        let results = vec![AgentResult::ok(AgentKind::Coach, "   ")];
        assert!(!synthesize(&results).trim().is_empty());
    }
}
