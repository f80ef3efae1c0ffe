//! Session domain: messages, session state, and the lifecycle service.

pub mod message;
pub mod model;
pub mod service;

pub use message::{ConversationMessage, MessageRole};
pub use model::{ChatSession, ResumedFrom};
pub use service::{PersistOutcome, ScopeReport, SessionService};
