//! FitBuddy - Multi-Agent Fitness Chatbot Orchestration Engine
//!
//! Intent-routing coordination core for a fitness chatbot: classifies
//! each inbound message, dispatches specialized capability agents (a
//! Logger talking to an external MCP-style tracking service, a Coach
//! producing LLM-driven advice), merges their results into one reply,
//! and emits it as a single payload or an incremental frame stream.
//!
//! # Architecture
//!
//! - **Orchestrator**: classification, planning, execution, synthesis
//! - **Capability agents**: Logger (structured facts, remote calls) and
//!   Coach (advisory text via the Model Gateway)
//! - **Model Gateway**: provider-agnostic text generation with bounded
//!   timeouts and sentinel failures
//! - **Memory Store**: per-(user, session) bounded conversation history

pub mod agents;
pub mod api;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod mcp;
pub mod memory;
pub mod orchestrator;
pub mod types;

// Re-export commonly used types
pub use errors::{AgentError, Result};
pub use orchestrator::Orchestrator;
