//! Capability agents
//!
//! Both agents implement one narrow contract: `handle(task) -> AgentResult`.
//! Implementations are required to never raise uncaught - every failure
//! path is captured and returned as `AgentResult { success: false, error }`
//! so the orchestrator alone decides user-visible wording.

pub mod coach;
pub mod logger;

pub use coach::CoachAgent;
pub use logger::LoggerAgent;

use crate::types::{AgentKind, AgentResult, AgentTask};
use async_trait::async_trait;

/// Single capability contract both agents are polymorphic over
#[async_trait]
pub trait CapabilityAgent: Send + Sync {
    /// Which agent this is, for dispatch and logging
    fn kind(&self) -> AgentKind;

    /// Execute one planned task. May suspend on remote calls; must not
    /// return early with an error - failures become failed results.
    async fn handle(&self, task: AgentTask) -> AgentResult;
}
