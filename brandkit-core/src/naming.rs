//! Brand-name suggestions.
//!
//! Asks the text generator for three names and keeps the numbered lines of
//! its answer. Any failure degrades to a fixed generic list; the returned
//! `Suggestions` records which of the two happened.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{self, GENERIC_SUGGESTIONS};
use crate::llm::TextGenerator;

const SYSTEM_PROMPT: &str =
    "You are a brand naming expert. Generate simple, practical names.";

/// How many names a suggestion round returns.
pub const SUGGESTION_COUNT: usize = 3;

/// Where a suggestion list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionOrigin {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions {
    pub names: Vec<String>,
    pub origin: SuggestionOrigin,
}

impl Suggestions {
    fn fallback() -> Self {
        Self {
            names: GENERIC_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            origin: SuggestionOrigin::Fallback,
        }
    }

    /// Per-industry alternates shown on "more".
    pub fn alternates(industry: &str) -> Self {
        Self {
            names: catalog::alternates_for(industry)
                .iter()
                .map(|s| s.to_string())
                .collect(),
            origin: SuggestionOrigin::Fallback,
        }
    }
}

/// Build the naming instruction for an industry and theme.
pub fn instruction(industry: &str, theme: &str) -> String {
    let industry = industry.to_lowercase();
    let theme = theme.to_lowercase();
    format!(
        "Generate {SUGGESTION_COUNT} short and simple brand names for a {industry} company.\n\
         The brand style is {theme}.\n\
         \n\
         Requirements:\n\
         - Maximum 2 words\n\
         - Easy to pronounce\n\
         - Related to {industry}\n\
         - Simple and memorable\n\
         - No complex or made-up words\n\
         \n\
         Format: 1. Name"
    )
}

/// Keep trimmed lines starting with a digit, at most `SUGGESTION_COUNT`.
pub fn parse_numbered(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.chars().next().is_some_and(|c| c.is_numeric()))
        .take(SUGGESTION_COUNT)
        .map(str::to_string)
        .collect()
}

/// Produces name suggestions, optionally backed by a text generator.
#[derive(Clone, Default)]
pub struct NameSuggester {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl NameSuggester {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// A suggester that always answers with the generic list.
    pub fn offline() -> Self {
        Self { generator: None }
    }

    pub async fn suggest(&self, industry: &str, theme: &str) -> Suggestions {
        let Some(generator) = &self.generator else {
            tracing::debug!("No text generator configured, using fallback names");
            return Suggestions::fallback();
        };

        let prompt = instruction(industry, theme);
        match generator.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(text) => {
                let names = parse_numbered(&text);
                if names.is_empty() {
                    tracing::warn!(%industry, "Name generation returned no numbered lines, using fallback");
                    return Suggestions::fallback();
                }
                Suggestions {
                    names,
                    origin: SuggestionOrigin::Generated,
                }
            }
            Err(e) => {
                tracing::warn!(%industry, error = %e, "Name generation failed, using fallback");
                Suggestions::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use async_trait::async_trait;

    struct Canned(Result<&'static str, ()>);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
            assert_eq!(system, SYSTEM_PROMPT);
            assert!(prompt.contains("Format: 1. Name"));
            self.0.map(str::to_string).map_err(|_| LlmError::Empty)
        }
    }

    #[test]
    fn instruction_lowercases_inputs() {
        let text = instruction("Food & Beverage", "Playful");
        assert!(text.contains("for a food & beverage company"));
        assert!(text.contains("The brand style is playful."));
        assert!(text.contains("- Maximum 2 words"));
    }

    #[test]
    fn parse_keeps_numbered_lines_only() {
        let text = "Here you go:\n\n 1. Nova \n2. Bright Path\nnotes\n3. Kin\n4. Extra";
        assert_eq!(parse_numbered(text), vec!["1. Nova", "2. Bright Path", "3. Kin"]);
        assert!(parse_numbered("no names here").is_empty());
    }

    #[tokio::test]
    async fn generated_names_are_tagged() {
        let suggester = NameSuggester::new(Arc::new(Canned(Ok("1. A\n2. B\n3. C\n4. D"))));
        let s = suggester.suggest("Technology", "Minimalist").await;
        assert_eq!(s.origin, SuggestionOrigin::Generated);
        assert_eq!(s.names.len(), 3);
    }

    #[tokio::test]
    async fn failure_falls_back_to_generic_list() {
        let suggester = NameSuggester::new(Arc::new(Canned(Err(()))));
        let s = suggester.suggest("Technology", "").await;
        assert_eq!(s.origin, SuggestionOrigin::Fallback);
        assert_eq!(s.names, GENERIC_SUGGESTIONS);
    }

    #[tokio::test]
    async fn unparseable_answer_falls_back() {
        let suggester = NameSuggester::new(Arc::new(Canned(Ok("I cannot help with that."))));
        let s = suggester.suggest("", "").await;
        assert_eq!(s.origin, SuggestionOrigin::Fallback);
        assert_eq!(s.names.len(), 3);
    }

    #[tokio::test]
    async fn offline_suggester_uses_fallback() {
        let s = NameSuggester::offline().suggest("Finance", "Professional").await;
        assert_eq!(s, Suggestions::fallback());
    }

    #[test]
    fn alternates_for_unknown_industry() {
        let s = Suggestions::alternates("Mining");
        assert_eq!(s.names.len(), 5);
        assert_eq!(s.names[4], "5. ElitePro");
    }
}
