//! The conversation stage machine.
//!
//! Two branches leave `initial`:
//!
//! ```text
//! initial ─yes─▶ brand_name_input ─▶ prompt_input ─▶ logo_generation
//!    └─other─▶ industry ─▶ theme ─▶ color_scheme ─▶ brand_name_selection ─▶ logo_generation
//! ```
//!
//! Each call to [`Conversation::respond`] performs at most one transition on
//! the session. A reply that matches no transition leaves the session as it
//! was and asks the user to start over.

use serde::Serialize;

use crate::catalog::{Catalog, Question};
use crate::naming::{NameSuggester, SuggestionOrigin, Suggestions};
use crate::session::{Attribute, BrandDetails, Session, SessionStore, Stage};

pub const INITIAL_QUESTION: &str = "Do you have a name for your brand/company?";
const BRAND_NAME_PROMPT: &str = "Please enter your brand name:";
const LOGO_PROMPT_PROMPT: &str =
    "Please enter your logo prompt (e.g., \"a professional logo for Trade using blue colors\"):";
const CUSTOM_PROMPT_THANKS: &str = "Thank you! Generating your logo with your custom prompt.";
const SUGGESTIONS_MESSAGE: &str = "Based on your responses, here are 3 brand name suggestions:\n(Type \"more\" if you want to see different suggestions)";
const ALTERNATES_MESSAGE: &str = "Here are some alternative suggestions:";
const GENERATING_MESSAGE: &str = "Thank you! Generating your logo...";
const RESET_MESSAGE: &str = "Something went wrong. Please start over.";

/// Replies at `brand_name_selection` that ask for other names.
const MORE_REQUESTS: [&str; 4] = ["new", "try again", "more", "other"];

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("Conversation not found")]
    NotFound,
    #[error("'{reply}' is not a valid choice, reply with a number between 1 and {options}")]
    InvalidSelection { reply: String, options: usize },
}

/// What the caller should do after this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    GenerateLogo,
}

/// Response to `start_conversation`.
#[derive(Debug, Clone, Serialize)]
pub struct Started {
    pub message: String,
    pub conversation_id: String,
}

/// Response to one user turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion_source: Option<SuggestionOrigin>,
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<NextStep>,
}

impl Reply {
    fn message(message: &str, stage: Stage) -> Self {
        Self {
            message: Some(message.to_string()),
            question: None,
            options: None,
            suggestions: None,
            suggestion_source: None,
            stage,
            next_step: None,
        }
    }

    fn question(q: &Question) -> Self {
        Self {
            message: None,
            question: Some(q.text.to_string()),
            options: Some(q.options.iter().map(|o| o.to_string()).collect()),
            suggestions: None,
            suggestion_source: None,
            stage: q.stage,
            next_step: None,
        }
    }

    fn suggestions(message: &str, suggestions: Suggestions) -> Self {
        Self {
            suggestions: Some(suggestions.names),
            suggestion_source: Some(suggestions.origin),
            ..Self::message(message, Stage::BrandNameSelection)
        }
    }

    fn generate(message: &str) -> Self {
        Self {
            next_step: Some(NextStep::GenerateLogo),
            ..Self::message(message, Stage::LogoGeneration)
        }
    }

    fn reset() -> Self {
        Self::message(RESET_MESSAGE, Stage::Initial)
    }
}

/// Drives brand discovery conversations.
pub struct Conversation {
    catalog: Catalog,
    sessions: SessionStore,
    suggester: NameSuggester,
}

impl Conversation {
    pub fn new(catalog: Catalog, suggester: NameSuggester) -> Self {
        Self {
            catalog,
            sessions: SessionStore::new(),
            suggester,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Open a new conversation.
    pub fn start(&self) -> Started {
        let conversation_id = self.sessions.create();
        tracing::info!(conversation = %conversation_id, "Conversation started");
        Started {
            message: INITIAL_QUESTION.to_string(),
            conversation_id,
        }
    }

    /// Brand details collected so far for a conversation.
    pub async fn brand_details(&self, id: &str) -> Option<BrandDetails> {
        self.sessions.snapshot(id).await.map(|s| s.brand_details)
    }

    /// Apply one user reply to a conversation.
    pub async fn respond(&self, id: &str, reply: &str) -> Result<Reply, ConversationError> {
        let handle = self.sessions.get(id).ok_or(ConversationError::NotFound)?;
        let mut session = handle.lock().await;
        tracing::debug!(
            conversation = %id,
            stage = %session.stage,
            age_secs = session.age().num_seconds(),
            %reply,
            "Processing reply"
        );

        let out = self.transition(&mut session, reply).await;
        match &out {
            Ok(r) => tracing::debug!(conversation = %id, stage = %r.stage, "Reply ready"),
            Err(e) => tracing::info!(conversation = %id, stage = %session.stage, "Rejected reply: {e}"),
        }
        out
    }

    async fn transition(&self, session: &mut Session, reply: &str) -> Result<Reply, ConversationError> {
        match session.stage {
            Stage::Initial => {
                if reply.trim().eq_ignore_ascii_case("yes") {
                    session.stage = Stage::BrandNameInput;
                    Ok(Reply::message(BRAND_NAME_PROMPT, Stage::BrandNameInput))
                } else {
                    Ok(self.next_question(session).await)
                }
            }
            Stage::BrandNameInput => {
                session.brand_details.set(Attribute::BrandName, reply);
                session.stage = Stage::PromptInput;
                Ok(Reply::message(LOGO_PROMPT_PROMPT, Stage::PromptInput))
            }
            Stage::PromptInput => {
                session.brand_details.set(Attribute::CustomPrompt, reply);
                session.stage = Stage::LogoGeneration;
                Ok(Reply::generate(CUSTOM_PROMPT_THANKS))
            }
            Stage::Industry | Stage::Theme | Stage::ColorScheme => {
                let current = session.question_index();
                let question = match (current, self.catalog.position(session.stage)) {
                    (Some(i), Some(p)) if i == p => self.catalog.get(i),
                    _ => None,
                };
                let Some(question) = question else {
                    return Ok(Reply::reset());
                };
                let selected =
                    question
                        .select(reply)
                        .ok_or_else(|| ConversationError::InvalidSelection {
                            reply: reply.to_string(),
                            options: question.options.len(),
                        })?;
                session.brand_details.set(question.attribute, selected);
                tracing::debug!(conversation = %session.id, stage = %question.stage, %selected, "Stored selection");
                Ok(self.next_question(session).await)
            }
            Stage::BrandNameSelection => {
                let wanted = reply.trim().to_lowercase();
                if MORE_REQUESTS.contains(&wanted.as_str()) {
                    let industry = session.brand_details.value(Attribute::Industry);
                    return Ok(Reply::suggestions(
                        ALTERNATES_MESSAGE,
                        Suggestions::alternates(industry),
                    ));
                }
                session.brand_details.set(Attribute::BrandName, reply);
                session.stage = Stage::LogoGeneration;
                Ok(Reply::generate(GENERATING_MESSAGE))
            }
            Stage::LogoGeneration => Ok(Reply::reset()),
        }
    }

    /// Ask the next catalog question, or move on to naming once the catalog
    /// is exhausted.
    async fn next_question(&self, session: &mut Session) -> Reply {
        let index = session.advance_question();
        if let Some(question) = self.catalog.get(index) {
            session.stage = question.stage;
            return Reply::question(question);
        }

        session.stage = Stage::BrandNameSelection;
        let details = &session.brand_details;
        let suggestions = self
            .suggester
            .suggest(
                details.value(Attribute::Industry),
                details.value(Attribute::Theme),
            )
            .await;
        tracing::info!(
            conversation = %session.id,
            origin = ?suggestions.origin,
            "Brand name suggestions ready"
        );
        Reply::suggestions(SUGGESTIONS_MESSAGE, suggestions)
    }
}
