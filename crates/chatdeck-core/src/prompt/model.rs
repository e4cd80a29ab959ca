use serde::{Deserialize, Serialize};

use super::variables::extract_variables;

/// A saved prompt template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PromptGroup {
    pub id: String,
    pub name: String,
    /// Template text, possibly containing `{{variable}}` placeholders
    pub prompt_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PromptGroup {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        prompt_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            prompt_text: prompt_text.into(),
            description: None,
        }
    }

    pub fn variables(&self) -> Vec<String> {
        extract_variables(&self.prompt_text)
    }
}

/// Prompt handed over by navigation into the chat view.
///
/// The receiver takes it out of its `Option` so going back does not apply it twice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PendingPrompt {
    pub prompt_text: String,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
}

impl PendingPrompt {
    pub fn into_group(self) -> PromptGroup {
        PromptGroup {
            id: self.group_id.unwrap_or_default(),
            name: self.group_name.unwrap_or_default(),
            prompt_text: self.prompt_text,
            description: None,
        }
    }
}
