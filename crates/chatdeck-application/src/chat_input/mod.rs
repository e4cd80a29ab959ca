//! Chat input controller.
//!
//! - `controller`: the state machine behind the message input (`ChatInputController`)

mod controller;

pub use controller::ChatInputController;
