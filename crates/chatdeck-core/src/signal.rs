//! Application-level signals the chat input reacts to.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AppSignal {
    /// Move keyboard focus into the input (new session, response finished).
    FocusChatInput,
    /// Ask about text the user selected elsewhere in the view.
    FollowUpQuestion {
        selected_text: String,
        #[serde(default)]
        prompt: Option<String>,
        #[serde(default)]
        auto_submit: bool,
    },
}

/// Formats a selection as a quoted context block.
pub fn quote_selection(selected_text: &str) -> String {
    let quoted = selected_text
        .trim()
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("Regarding this selection:\n{quoted}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_selection() {
        assert_eq!(
            quote_selection("first\n\nsecond\n"),
            "Regarding this selection:\n> first\n>\n> second"
        );
    }

    #[test]
    fn test_signal_wire_shape() {
        let signal: AppSignal = serde_json::from_str(
            r#"{"type":"follow-up-question","selected_text":"x","auto_submit":true}"#,
        )
        .unwrap();
        assert_eq!(
            signal,
            AppSignal::FollowUpQuestion {
                selected_text: "x".to_string(),
                prompt: None,
                auto_submit: true
            }
        );
    }
}
