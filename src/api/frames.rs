//! Streaming reply frames
//!
//! OpenAI-style `chat.completion.chunk` frames. The external contract:
//! the first frame carries classification metadata and empty content, the
//! middle frames carry content deltas in generation order, and the last
//! frame carries `finish_reason: "stop"` and no content. The transport
//! terminates the stream with the literal `STREAM_DONE_MARKER`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Literal completion marker emitted by the transport after the last frame
pub const STREAM_DONE_MARKER: &str = "[DONE]";

/// Classification metadata attached to the first frame only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameMetadata {
    pub intent: String,
    pub confidence: f64,
    pub extracted_info: HashMap<String, String>,
    pub llm_provider: String,
    /// False when classification stayed on the rule-based path
    pub model_assisted: bool,
}

/// Incremental message content
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Delta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameChoice {
    pub index: u32,
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

/// One streamed reply frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamFrame {
    pub id: String,
    pub object: String,
    /// Unix timestamp in seconds
    pub created: i64,
    pub model: String,
    pub choices: Vec<FrameChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FrameMetadata>,
}

/// Stamps every frame of one reply with a shared id, model, and timestamp
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    id: String,
    model: String,
    created: i64,
}

impl FrameBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            id: format!("chatcmpl-{}", Uuid::new_v4()),
            model: model.into(),
            created: chrono::Utc::now().timestamp(),
        }
    }

    fn frame(&self, delta: Delta, finish_reason: Option<String>) -> StreamFrame {
        StreamFrame {
            id: self.id.clone(),
            object: "chat.completion.chunk".to_string(),
            created: self.created,
            model: self.model.clone(),
            choices: vec![FrameChoice {
                index: 0,
                delta,
                finish_reason,
            }],
            metadata: None,
        }
    }

    /// First frame: role + metadata, empty content
    pub fn metadata_frame(&self, metadata: FrameMetadata) -> StreamFrame {
        let mut frame = self.frame(
            Delta {
                role: Some("assistant".to_string()),
                content: None,
            },
            None,
        );
        frame.metadata = Some(metadata);
        frame
    }

    /// Middle frame: one content delta
    pub fn content_frame(&self, content: impl Into<String>) -> StreamFrame {
        self.frame(
            Delta {
                role: None,
                content: Some(content.into()),
            },
            None,
        )
    }

    /// Final frame: no content, finish_reason "stop"
    pub fn stop_frame(&self) -> StreamFrame {
        self.frame(Delta::default(), Some("stop".to_string()))
    }
}

impl StreamFrame {
    /// Content delta carried by this frame, if any
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
    }

    /// True for the terminal frame
    pub fn is_stop(&self) -> bool {
        self.choices
            .first()
            .map(|c| c.finish_reason.as_deref() == Some("stop"))
            .unwrap_or(false)
    }
}
