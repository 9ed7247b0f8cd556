//! brandkit-core: the brand discovery wizard without its HTTP surface.
//!
//! - `catalog`: discovery questions and fallback name tables
//! - `session`: per-conversation state and the keyed session store
//! - `conversation`: the stage machine driving each user turn
//! - `naming`: brand-name suggestions with explicit fallback
//! - `llm`: chat-completions client used for naming
//! - `prompt`: logo generation prompt synthesis

pub mod catalog;
pub mod conversation;
pub mod ids;
pub mod llm;
pub mod naming;
pub mod prompt;
pub mod session;

pub use conversation::{Conversation, ConversationError, NextStep, Reply, Started};
pub use session::{Attribute, BrandDetails, Session, SessionStore, Stage};
