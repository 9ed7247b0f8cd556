//! Per-conversation state and the in-memory session store.
//!
//! Sessions live for the lifetime of the process. The outer map is guarded
//! by a short-lived `parking_lot` lock; each session has its own async lock
//! so a turn may hold it across the naming call without blocking other
//! conversations.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::ids;

/// Step of the guided conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Initial,
    Industry,
    Theme,
    ColorScheme,
    BrandNameInput,
    PromptInput,
    BrandNameSelection,
    LogoGeneration,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Initial => "initial",
            Stage::Industry => "industry",
            Stage::Theme => "theme",
            Stage::ColorScheme => "color_scheme",
            Stage::BrandNameInput => "brand_name_input",
            Stage::PromptInput => "prompt_input",
            Stage::BrandNameSelection => "brand_name_selection",
            Stage::LogoGeneration => "logo_generation",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collected brand attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Industry,
    Theme,
    ColorScheme,
    BrandName,
    CustomPrompt,
}

/// Everything collected about the brand so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

impl BrandDetails {
    pub fn get(&self, attr: Attribute) -> Option<&str> {
        match attr {
            Attribute::Industry => self.industry.as_deref(),
            Attribute::Theme => self.theme.as_deref(),
            Attribute::ColorScheme => self.color_scheme.as_deref(),
            Attribute::BrandName => self.brand_name.as_deref(),
            Attribute::CustomPrompt => self.custom_prompt.as_deref(),
        }
    }

    pub fn set(&mut self, attr: Attribute, value: impl Into<String>) {
        let slot = match attr {
            Attribute::Industry => &mut self.industry,
            Attribute::Theme => &mut self.theme,
            Attribute::ColorScheme => &mut self.color_scheme,
            Attribute::BrandName => &mut self.brand_name,
            Attribute::CustomPrompt => &mut self.custom_prompt,
        };
        *slot = Some(value.into());
    }

    /// Attribute value, or "" when it was never collected.
    pub fn value(&self, attr: Attribute) -> &str {
        self.get(attr).unwrap_or_default()
    }
}

/// State of one conversation.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub stage: Stage,
    pub brand_details: BrandDetails,
    /// `None` until the guided questions start. Only ever moves forward.
    question_index: Option<usize>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: String) -> Self {
        Self {
            id,
            stage: Stage::Initial,
            brand_details: BrandDetails::default(),
            question_index: None,
            created_at: Utc::now(),
        }
    }

    /// Time since the conversation was started.
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.created_at
    }

    pub fn question_index(&self) -> Option<usize> {
        self.question_index
    }

    /// Move to the next catalog question and return its index.
    pub fn advance_question(&mut self) -> usize {
        let next = self.question_index.map_or(0, |i| i + 1);
        self.question_index = Some(next);
        next
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Keyed store of live conversations.
#[derive(Default)]
pub struct SessionStore {
    sessions: parking_lot::Mutex<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh session and return its id.
    pub fn create(&self) -> String {
        let id = ids::conversation_id();
        let session = Session::new(id.clone());
        self.sessions
            .lock()
            .insert(id.clone(), Arc::new(Mutex::new(session)));
        id
    }

    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.lock().get(id).cloned()
    }

    /// Clone of the current session state.
    pub async fn snapshot(&self, id: &str) -> Option<Session> {
        let handle = self.get(id)?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
