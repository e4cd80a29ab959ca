//! Slash commands that are handled locally instead of inserting a prompt.

use serde::{Deserialize, Serialize};

/// A command name the popover reserves for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReservedCommand {
    /// Hand the conversation to the template-authoring flow.
    CreateTemplate,
}

impl ReservedCommand {
    pub const ALL: [ReservedCommand; 1] = [ReservedCommand::CreateTemplate];

    /// Parses a command name with or without its leading `/`.
    pub fn parse(command: &str) -> Option<Self> {
        match command.trim().trim_start_matches('/') {
            "create-template" => Some(Self::CreateTemplate),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::CreateTemplate => "create-template",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::CreateTemplate => "Create a reusable prompt template from this conversation",
        }
    }
}

/// Instruction sent to the template-authoring flow for `/create-template`.
///
/// A non-blank transcript is embedded so the author can base the template on it.
pub fn build_create_template_instruction(transcript: Option<&str>) -> String {
    match transcript.map(str::trim).filter(|t| !t.is_empty()) {
        Some(transcript) => format!(
            "Help me create a reusable prompt template based on the following conversation. \
             Identify the recurring task, turn the parts that change into {{{{variables}}}}, \
             and suggest a short name and description.\n\n\
             <conversation>\n{transcript}\n</conversation>"
        ),
        None => "Help me create a reusable prompt template. Ask me what task it should cover, \
                 then draft the template with {{variables}} for the parts that change, \
                 and suggest a short name and description."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_slash() {
        for input in ["create-template", "/create-template"] {
            assert_eq!(ReservedCommand::parse(input), Some(ReservedCommand::CreateTemplate));
        }
        assert_eq!(ReservedCommand::parse("summarize"), None);
    }

    #[test]
    fn test_instruction_embeds_transcript() {
        let instruction = build_create_template_instruction(Some("User: hi\nAssistant: hello"));
        let block = "<conversation>\nUser: hi\nAssistant: hello\n</conversation>";
        assert!(instruction.contains(block));
        assert!(instruction.contains("{{variables}}"));
    }

    #[test]
    fn test_instruction_without_transcript() {
        let instruction = build_create_template_instruction(Some("   "));
        assert!(!instruction.contains("<conversation>"));
        assert!(instruction.contains("{{variables}}"));
    }
}
