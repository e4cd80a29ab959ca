//! Prompt templates selectable from the slash-command popover.
//!
//! - `model`: prompt group references and router-carried pending prompts
//! - `variables`: `{{name}}` placeholder extraction and substitution
//! - `reserved`: commands handled locally instead of being inserted

mod model;
mod reserved;
mod variables;

pub use model::{PendingPrompt, PromptGroup};
pub use reserved::{ReservedCommand, build_create_template_instruction};
pub use variables::{VariableValues, extract_variables, missing_variables, substitute_variables};
