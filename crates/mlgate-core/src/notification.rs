//! Team notification formatting.

use serde::Serialize;
use serde_json::Value as JsonValue;

/// Subject used for every pipeline completion notice.
pub const COMPLETION_SUBJECT: &str = "ML process completed";

const RULE: &str = "------------------------------";

/// How the message body should be interpreted by the messaging service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStructure {
    /// Body is a JSON object keyed by delivery protocol
    Json,
    /// Body is plain text
    Raw,
}

/// A message ready to publish to a topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub subject: String,
    pub message: String,
    pub message_structure: MessageStructure,
}

impl Notification {
    /// Completion notice summarizing a workflow payload.
    ///
    /// The body is `{"default": <text>}` so every subscriber protocol gets
    /// the same text.
    pub fn process_completed(summary: &JsonValue) -> Result<Self, serde_json::Error> {
        let text = format!(
            "Process completed.\n{rule}\nSummary of the process:\n{rule}\n{summary}",
            rule = RULE,
            summary = serde_json::to_string(summary)?,
        );
        let message = serde_json::to_string(&serde_json::json!({ "default": text }))?;

        Ok(Self {
            subject: COMPLETION_SUBJECT.to_string(),
            message,
            message_structure: MessageStructure::Json,
        })
    }

    /// Text delivered to subscribers without a protocol-specific entry.
    pub fn default_text(&self) -> Option<String> {
        match self.message_structure {
            MessageStructure::Raw => Some(self.message.clone()),
            MessageStructure::Json => serde_json::from_str::<JsonValue>(&self.message)
                .ok()?
                .get("default")?
                .as_str()
                .map(str::to_string),
        }
    }
}
