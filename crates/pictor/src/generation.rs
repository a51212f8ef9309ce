//! Provenance recorded alongside generated images.

use pictor_storage::MetadataRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How an image was generated.
///
/// Flattened into the metadata record under the keys `original_prompt`,
/// `translated_prompt`, `model_id` and `parameters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationDetails {
    /// Prompt as the user typed it
    pub original_prompt: String,
    /// Prompt actually sent to the model, if it was rewritten
    pub translated_prompt: Option<String>,
    /// Model identifier (e.g. "black-forest-labs/flux-schnell")
    pub model_id: String,
    /// Model input parameters
    #[serde(default)]
    pub parameters: MetadataRecord,
}

impl GenerationDetails {
    /// Details for `prompt` sent unchanged to `model_id`.
    pub fn new(prompt: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            original_prompt: prompt.into(),
            translated_prompt: None,
            model_id: model_id.into(),
            parameters: MetadataRecord::new(),
        }
    }

    /// Record the rewritten prompt.
    pub fn with_translated_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.translated_prompt = Some(prompt.into());
        self
    }

    /// Record one model parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Write these details into `record`, replacing any same-named keys.
    pub fn merge_into(self, record: &mut MetadataRecord) {
        record.insert("original_prompt".into(), Value::String(self.original_prompt));
        record.insert(
            "translated_prompt".into(),
            self.translated_prompt.map_or(Value::Null, Value::String),
        );
        record.insert("model_id".into(), Value::String(self.model_id));
        record.insert("parameters".into(), Value::Object(self.parameters));
    }
}
