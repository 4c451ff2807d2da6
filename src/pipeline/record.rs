use serde::Deserialize;
use serde_json::Value;

/// One message as printed by `kcat -J`.
///
/// Only the fields the finder displays are kept; anything else in the
/// envelope (key, headers, broker, tstype) is still searched through the
/// raw line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StructuredRecord {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    /// Epoch milliseconds
    #[serde(alias = "ts")]
    pub timestamp: i64,
    pub payload: Value,
}

impl StructuredRecord {
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Payload as display text: strings verbatim, null as empty, anything
    /// else as compact JSON.
    pub fn payload_text(&self) -> String {
        match &self.payload {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}
