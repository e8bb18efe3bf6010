use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Defaults applied by the normalizer when the client omits the fields
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

// Validated, shape-stable request passed down the pipeline.
// Built once by normalize(); endpoints may override fields before streaming.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub prompt: String,
    pub system_message: Option<String>,
    pub temperature: f32,
    pub stream: bool,
}

// One message in the upstream chat completion call
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl NormalizedRequest {
    // Two-part message list: optional system instruction, then the user prompt
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system_message {
            messages.push(ChatMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: self.prompt.clone(),
        });
        messages
    }
}

// Document save request body
#[derive(Debug, Deserialize)]
pub struct SaveDocumentRequest {
    pub id: String,
    pub content: String,
}

// Stored document state
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub content: String,
    pub timestamp: DateTime<Utc>,
}
