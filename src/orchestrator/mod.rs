//! Request orchestration
//!
//! The coordination core: classifies each inbound message, resolves an
//! execution plan, dispatches capability agents, merges their results
//! into one reply, and emits it as a single payload or a frame stream.
//! Each request walks the state machine in `state`; the orchestrator is
//! the single point deciding user-visible wording, so no internal error
//! text ever reaches a client payload.

pub mod classify;
pub mod execute;
pub mod plan;
pub mod state;
pub mod stream;
pub mod synthesize;

pub use classify::IntentClassifier;
pub use execute::AgentRegistry;
pub use state::{RequestEvent, RequestState};
pub use synthesize::HELP_MESSAGE;

use crate::agents::{CapabilityAgent, CoachAgent, LoggerAgent};
use crate::api::{
    AgentLog, ChatRequest, ChatResponse, FrameBuilder, FrameMetadata, HealthReport, StreamFrame,
};
use crate::config::Config;
use crate::errors::Result;
use crate::gateway::ModelGateway;
use crate::mcp::{McpClient, RemoteService};
use crate::memory::MemoryStore;
use crate::types::{AgentKind, AgentResult, ConversationTurn, Message, Role};
use futures_util::Stream;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Coordinates classification, planning, execution, and synthesis for
/// every request. Owns no per-request state between calls; everything
/// that outlives a request lives in the memory store.
pub struct Orchestrator {
    agents: AgentRegistry,
    gateway: Arc<ModelGateway>,
    classifier: IntentClassifier,
    memory: Arc<MemoryStore>,
    deadline: Duration,
    stream_chunk_chars: usize,
    history_limit: usize,
}

impl Orchestrator {
    /// Build an orchestrator from static configuration. Provider choice
    /// is read once here, never per-request.
    pub fn new(config: &Config) -> Result<Self> {
        let gateway = Arc::new(ModelGateway::from_config(&config.llm)?);
        let remote: Arc<dyn RemoteService> = Arc::new(McpClient::new(&config.mcp)?);
        let memory = Arc::new(MemoryStore::from_config(&config.memory));

        Ok(Self::with_components(gateway, remote, memory, config))
    }

    /// Assemble from pre-built collaborators
    pub fn with_components(
        gateway: Arc<ModelGateway>,
        remote: Arc<dyn RemoteService>,
        memory: Arc<MemoryStore>,
        config: &Config,
    ) -> Self {
        let mut agents: AgentRegistry = HashMap::new();
        agents.insert(
            AgentKind::Logger,
            Arc::new(LoggerAgent::new(remote)) as Arc<dyn CapabilityAgent>,
        );
        agents.insert(
            AgentKind::Coach,
            Arc::new(CoachAgent::new(Arc::clone(&gateway))) as Arc<dyn CapabilityAgent>,
        );

        Self {
            agents,
            classifier: IntentClassifier::new(
                Arc::clone(&gateway),
                config.orchestrator.escalation_threshold,
            ),
            gateway,
            memory,
            deadline: Duration::from_secs(config.orchestrator.request_deadline_secs),
            stream_chunk_chars: config.orchestrator.stream_chunk_chars,
            history_limit: config.memory.history_limit,
        }
    }

    /// Handle one request end to end, returning the full reply at once
    pub async fn process(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let turn = self.run_turn(request).await?;

        // Full-turn persistence: both sides land together, after emission.
        self.persist_turn(request, &turn.reply, &turn.intent).await;

        let state = turn.state.transition(RequestEvent::Emit)?;
        debug!(terminal = state.is_terminal(), "request complete");

        Ok(ChatResponse {
            response: turn.reply,
            logs: turn.logs,
        })
    }

    /// Handle one request end to end, emitting the reply incrementally.
    ///
    /// The first frame carries classification metadata with empty content;
    /// the last frame carries `finish_reason: "stop"`. The conversation
    /// turn is persisted only after the stop frame is handed off, so a
    /// client disconnect leaves memory untouched.
    pub async fn process_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<impl Stream<Item = StreamFrame>> {
        let turn = self.run_turn(request).await?;

        let metadata = FrameMetadata {
            intent: turn.intent.clone(),
            confidence: turn.confidence,
            extracted_info: turn.extracted,
            llm_provider: self.gateway.provider_id().to_string(),
            model_assisted: turn.model_assisted,
        };

        let memory = Arc::clone(&self.memory);
        let request = request.clone();
        let reply = turn.reply.clone();
        let intent = turn.intent.clone();
        let state = turn.state;
        let persist = async move {
            let user_turn = ConversationTurn::new(
                &request.user_id,
                &request.session_id,
                Role::User,
                &request.message,
            );
            let assistant_turn = ConversationTurn::new(
                &request.user_id,
                &request.session_id,
                Role::Assistant,
                &reply,
            )
            .with_metadata("intent", serde_json::json!(intent));

            memory.append_exchange(user_turn, assistant_turn).await;

            if let Ok(terminal) = state.transition(RequestEvent::Emit) {
                debug!(terminal = terminal.is_terminal(), "stream complete");
            }
        };

        Ok(stream::reply_stream(
            FrameBuilder::new(self.gateway.model()),
            metadata,
            turn.reply,
            self.stream_chunk_chars,
            persist,
        ))
    }

    /// Classify, plan, execute, and synthesize one request. Shared by the
    /// streaming and non-streaming paths so their text cannot drift.
    async fn run_turn(&self, request: &ChatRequest) -> Result<TurnOutcome> {
        request.validate()?;
        let mut state = RequestState::Received;

        let history = self
            .memory
            .get_history(&request.user_id, &request.session_id, self.history_limit)
            .await;

        // Under the summarizing policy, evicted turns survive as a rolling
        // summary; surface it ahead of the verbatim window.
        let mut context: Vec<Message> = Vec::with_capacity(history.len() + 1);
        if let Some(summary) = self
            .memory
            .get_summary(&request.user_id, &request.session_id)
            .await
        {
            context.push(Message::new(
                &request.user_id,
                format!("Earlier in this conversation: {}", summary),
            ));
        }
        context.extend(history.iter().map(|t| Message {
            user_id: t.user_id.clone(),
            text: t.text.clone(),
            timestamp: t.timestamp,
        }));

        let classification = self.classifier.classify(&request.message, &context).await;
        state = state.transition(RequestEvent::Classify)?;
        info!(
            user_id = %request.user_id,
            intent = classification.category.as_str(),
            confidence = classification.confidence,
            model_assisted = classification.model_assisted,
            "classified request"
        );

        let plan = plan::plan(&classification, &request.user_id, &request.message);
        state = state.transition(RequestEvent::Plan)?;

        state = state.transition(RequestEvent::Execute)?;
        let results: Vec<AgentResult> =
            execute::execute(&self.agents, &plan, self.deadline).await;

        let reply = synthesize::synthesize(&results);
        state = state.transition(RequestEvent::Synthesize)?;

        let logs: Vec<AgentLog> = execute::build_logs(&plan, &results);

        Ok(TurnOutcome {
            reply,
            logs,
            intent: classification.category.as_str().to_string(),
            confidence: classification.confidence,
            extracted: classification.extracted,
            model_assisted: classification.model_assisted,
            state,
        })
    }

    async fn persist_turn(&self, request: &ChatRequest, reply: &str, intent: &str) {
        let user_turn = ConversationTurn::new(
            &request.user_id,
            &request.session_id,
            Role::User,
            &request.message,
        );
        let assistant_turn = ConversationTurn::new(
            &request.user_id,
            &request.session_id,
            Role::Assistant,
            reply,
        )
        .with_metadata("intent", serde_json::json!(intent));

        self.memory.append_exchange(user_turn, assistant_turn).await;
    }

    /// Liveness/readiness report for the health surface
    pub async fn health(&self) -> HealthReport {
        self.gateway.health().await
    }

    /// Memory store handle for the management surface (stats, clear,
    /// search, get-conversation)
    pub fn memory(&self) -> &Arc<MemoryStore> {
        &self.memory
    }
}

/// Everything one processed turn produced, before emission
struct TurnOutcome {
    reply: String,
    logs: Vec<AgentLog>,
    intent: String,
    confidence: f64,
    extracted: HashMap<String, String>,
    model_assisted: bool,
    state: RequestState,
}
