//! Draft message text and the slash-command trigger heuristics.
//!
//! Cursor positions are char offsets, never byte offsets, so multi-byte input
//! behaves the same as ASCII.

use serde::{Deserialize, Serialize};

/// The in-progress, unsent message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    text: String,
    cursor: usize,
    /// Extra context (e.g. quoted selection) appended on submit.
    context: Option<String>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Replaces the text, clamping the cursor into range.
    pub fn set(&mut self, text: impl Into<String>, cursor: usize) {
        self.text = text.into();
        self.cursor = cursor.min(self.text.chars().count());
    }

    /// Replaces the text and puts the cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.chars().count();
    }

    pub fn set_context(&mut self, context: Option<String>) {
        self.context = context.filter(|c| !c.trim().is_empty());
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Clears the text only; context survives.
    pub fn clear_text(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Clears text and context.
    pub fn clear(&mut self) {
        self.clear_text();
        self.context = None;
    }

    /// Appends speech-to-text output, separated by one space when needed.
    pub fn append_transcription(&mut self, transcript: &str) {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return;
        }
        if !self.text.is_empty() && !self.text.ends_with(char::is_whitespace) {
            self.text.push(' ');
        }
        self.text.push_str(transcript);
        self.cursor = self.text.chars().count();
    }

    /// The message actually sent: text followed by the context block, if any.
    pub fn compose_message(&self) -> String {
        compose_message(&self.text, self.context.as_deref())
    }
}

/// Joins message text and optional context with a blank line.
pub fn compose_message(text: &str, context: Option<&str>) -> String {
    match context {
        Some(context) if !context.trim().is_empty() => {
            if text.trim().is_empty() {
                context.to_string()
            } else {
                format!("{text}\n\n{context}")
            }
        }
        _ => text.to_string(),
    }
}

/// Byte index of the `char_offset`-th char (or `text.len()` past the end).
pub fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

pub fn text_before_cursor(text: &str, cursor: usize) -> &str {
    &text[..byte_index(text, cursor)]
}

/// True when the char just typed before the cursor is a `/` that starts a
/// token: it sits at the start of the text or right after a space or newline.
pub fn is_slash_trigger(text: &str, cursor: usize) -> bool {
    let mut before = text_before_cursor(text, cursor).chars().rev();
    match before.next() {
        Some('/') => matches!(before.next(), None | Some(' ') | Some('\n')),
        _ => false,
    }
}

/// Char offset of the last `/` before the cursor.
pub fn slash_token_start(text: &str, cursor: usize) -> Option<usize> {
    let before = text_before_cursor(text, cursor);
    before
        .rfind('/')
        .map(|byte_idx| before[..byte_idx].chars().count())
}

/// The filter text typed after the active `/`, used to narrow the prompt list.
pub fn slash_query(text: &str, cursor: usize) -> Option<&str> {
    let before = text_before_cursor(text, cursor);
    before.rfind('/').map(|byte_idx| &before[byte_idx + 1..])
}

/// Replaces the `/`-token span ending at the cursor with `replacement`.
///
/// Text after the cursor is preserved. Without a `/` before the cursor the
/// replacement is inserted at the cursor. Returns the new text and the cursor
/// placed right after the inserted text.
pub fn replace_slash_token(text: &str, cursor: usize, replacement: &str) -> (String, usize) {
    let cursor = cursor.min(text.chars().count());
    let start = slash_token_start(text, cursor).unwrap_or(cursor);
    let start_byte = byte_index(text, start);
    let end_byte = byte_index(text, cursor);

    let mut result = String::with_capacity(text.len() + replacement.len());
    result.push_str(&text[..start_byte]);
    result.push_str(replacement);
    result.push_str(&text[end_byte..]);

    (result, start + replacement.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_trigger_at_start_and_after_whitespace() {
        assert!(is_slash_trigger("/", 1));
        assert!(is_slash_trigger("hello /", 7));
        assert!(is_slash_trigger("line\n/", 6));
    }

    #[test]
    fn test_slash_trigger_not_after_word() {
        assert!(!is_slash_trigger("and/", 4));
        assert!(!is_slash_trigger("http://", 7));
        assert!(!is_slash_trigger("hello", 5));
        assert!(!is_slash_trigger("", 0));
    }

    #[test]
    fn test_slash_trigger_uses_cursor_not_end() {
        // Cursor sits right after the slash, more text follows.
        assert!(is_slash_trigger("a / b", 3));
        assert!(!is_slash_trigger("a / b", 5));
    }

    #[test]
    fn test_replace_slash_token() {
        let (text, cursor) = replace_slash_token("hello /wor", 10, "world!");
        assert_eq!(text, "hello world!");
        assert_eq!(cursor, 12);
    }

    #[test]
    fn test_replace_slash_token_keeps_tail() {
        let (text, cursor) = replace_slash_token("a /su tail", 5, "summary");
        assert_eq!(text, "a summary tail");
        assert_eq!(cursor, 9);
    }

    #[test]
    fn test_replace_without_slash_inserts_at_cursor() {
        let (text, cursor) = replace_slash_token("ab", 1, "X");
        assert_eq!(text, "aXb");
        assert_eq!(cursor, 2);
    }

    #[test]
    fn test_multibyte_offsets() {
        let text = "日本 /pr";
        assert!(is_slash_trigger(text, 4));
        assert_eq!(slash_query(text, 6), Some("pr"));
        let (replaced, cursor) = replace_slash_token(text, 6, "プロンプト");
        assert_eq!(replaced, "日本 プロンプト");
        assert_eq!(cursor, 8);
    }

    #[test]
    fn test_append_transcription_spacing() {
        let mut draft = Draft::new();
        draft.append_transcription("hello");
        assert_eq!(draft.text(), "hello");
        draft.append_transcription("world");
        assert_eq!(draft.text(), "hello world");
        draft.set_text("trailing ");
        draft.append_transcription("space");
        assert_eq!(draft.text(), "trailing space");
        assert_eq!(draft.cursor(), 14);
        draft.set_text("line\n");
        draft.append_transcription("  next  ");
        assert_eq!(draft.text(), "line\nnext");
        draft.append_transcription("   ");
        assert_eq!(draft.text(), "line\nnext");
    }

    #[test]
    fn test_compose_message_with_context() {
        assert_eq!(compose_message("hi", None), "hi");
        assert_eq!(compose_message("hi", Some("> quoted")), "hi\n\n> quoted");
        assert_eq!(compose_message("  ", Some("> quoted")), "> quoted");
    }

    #[test]
    fn test_set_clamps_cursor() {
        let mut draft = Draft::new();
        draft.set("abc", 99);
        assert_eq!(draft.cursor(), 3);
    }
}
