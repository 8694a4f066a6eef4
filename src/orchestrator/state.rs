//! Per-request state machine
//!
//! Every request walks the same chain: Received -> Classified -> Planned
//! -> Executing -> Synthesized -> Emitted. No request may skip a state;
//! Executing may fan out internally but the orchestrator does not move to
//! Synthesized until every planned task reached a terminal outcome.
//! Emitted is terminal; there are no retry transitions at this level.

use crate::errors::{AgentError, Result};
use serde::{Deserialize, Serialize};

/// Request lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestState {
    /// Inbound message accepted and validated
    Received,
    /// Intent classification produced
    Classified,
    /// Execution plan resolved
    Planned,
    /// Agent tasks running (fan-out/fan-in point)
    Executing,
    /// Final reply text assembled
    Synthesized,
    /// Reply fully emitted (terminal)
    Emitted,
}

/// Events that advance the request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEvent {
    Classify,
    Plan,
    Execute,
    Synthesize,
    Emit,
}

impl RequestState {
    /// Check if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Emitted)
    }

    /// Attempt state transition with validation.
    ///
    /// Valid transitions (5 edges, strictly linear):
    /// 1. Received    -> Classified  (on: Classify)
    /// 2. Classified  -> Planned     (on: Plan)
    /// 3. Planned     -> Executing   (on: Execute)
    /// 4. Executing   -> Synthesized (on: Synthesize)
    /// 5. Synthesized -> Emitted     (on: Emit)
    pub fn transition(&self, event: RequestEvent) -> Result<RequestState> {
        use RequestEvent::*;
        use RequestState::*;

        let next = match (self, event) {
            (Received, Classify) => Classified,
            (Classified, Plan) => Planned,
            (Planned, Execute) => Executing,
            (Executing, Synthesize) => Synthesized,
            (Synthesized, Emit) => Emitted,

            (from, event) => {
                return Err(AgentError::InvalidTransition {
                    from: format!("{:?}", from),
                    to: format!("(via {:?})", event),
                    reason: format!("No valid transition from {:?} on {:?}", from, event),
                });
            }
        };

        Ok(next)
    }
}
