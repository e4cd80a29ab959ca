//! Session collaborators of the chat input.
//!
//! # Module Structure
//!
//! - `tracker`: session identity and change detection (`SessionTracker`)
//! - `context`: the port the controller calls into (`SessionContext`)
//! - `notification`: user-visible notifications (`Notification`)

mod context;
mod notification;
mod tracker;

pub use context::{SessionContext, TemplateNavigator};
pub use notification::{Notification, NotificationLevel};
pub use tracker::{SessionTracker, SessionTransition};
