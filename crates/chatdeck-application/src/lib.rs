//! Application layer for ChatDeck.
//!
//! This crate wires the domain rules from `chatdeck-core` into the stateful
//! chat input controller and the in-process signal bus the view publishes to.

pub mod chat_input;
pub mod signal_bus;

pub use chat_input::ChatInputController;
pub use signal_bus::{SignalBus, SignalSubscription};
