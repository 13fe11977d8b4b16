//! Natural-language understanding
//!
//! Each user session owns one `UnderstandingEngine`. The engine loads an
//! intent model from a JSON artifact exactly once, then serves queries
//! against it. "No intent matched" is a normal outcome, not an error; only
//! infrastructure failures (missing artifact, unloaded model) are errors.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::config::Language;
use crate::{Error, Result};

/// Minimum token-overlap score for an utterance to count as a match
const MATCH_THRESHOLD: f64 = 0.5;

/// Intent model artifact schema
#[derive(Debug, Deserialize)]
struct ModelFile {
    intents: Vec<Intent>,
}

/// A single intent and its sample utterances
#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    /// Intent identifier, e.g. "lights.on"
    pub name: String,
    /// Sample utterances that express this intent
    pub utterances: Vec<String>,
}

/// An intent classifier loaded from a JSON artifact
#[derive(Debug)]
pub struct IntentModel {
    intents: Vec<Intent>,
}

impl IntentModel {
    /// Load the model from its artifact path
    ///
    /// # Errors
    ///
    /// Returns a `model` error if the artifact cannot be read or parsed, or
    /// declares no intents.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Model(format!(
                "failed to read intent model {}: {e}",
                path.display()
            ))
        })?;

        let file: ModelFile = serde_json::from_str(&content)
            .map_err(|e| Error::Model(format!("failed to parse intent model: {e}")))?;

        if file.intents.is_empty() {
            return Err(Error::Model("intent model declares no intents".to_string()));
        }

        Ok(Self {
            intents: file.intents,
        })
    }

    /// Number of intents in the model
    #[must_use]
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// Whether the model holds no intents (never true after a successful load)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Score the text against every sample utterance and return the best
    /// intent at or above the match threshold
    fn classify(&self, text: &str) -> Option<(String, f64)> {
        let query: HashSet<String> = tokenize(text).into_iter().collect();
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(String, f64)> = None;
        for intent in &self.intents {
            for utterance in &intent.utterances {
                let tokens = tokenize(utterance);
                if tokens.is_empty() {
                    continue;
                }
                let overlap = tokens.iter().filter(|t| query.contains(*t)).count();
                #[allow(clippy::cast_precision_loss)]
                let score = overlap as f64 / tokens.len() as f64;
                if score >= MATCH_THRESHOLD
                    && best.as_ref().is_none_or(|(_, s)| score > *s)
                {
                    best = Some((intent.name.clone(), score));
                }
            }
        }
        best
    }
}

/// Lowercased alphanumeric tokens of a phrase
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Outcome of the understanding pipeline for one query
#[derive(Debug, Clone, PartialEq)]
pub enum Understanding {
    /// An intent matched with the given confidence
    Match { intent: String, confidence: f64 },
    /// No intent matched (normal outcome)
    NoMatch,
}

/// Per-session understanding engine
///
/// Owned exclusively by one session; there is no cross-session sharing of
/// loaded model state.
#[derive(Debug)]
pub struct UnderstandingEngine {
    language: Language,
    model: Option<IntentModel>,
}

impl UnderstandingEngine {
    /// Create an engine with no model loaded yet
    #[must_use]
    pub const fn new(language: Language) -> Self {
        Self {
            language,
            model: None,
        }
    }

    /// Whether the model has been loaded
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Load the intent model from its artifact path, at most once
    ///
    /// # Errors
    ///
    /// Returns a `model` error if the artifact fails to load or if a model
    /// was already loaded into this engine.
    pub async fn load_model(&mut self, path: &Path) -> Result<()> {
        if self.model.is_some() {
            return Err(Error::Model("intent model already loaded".to_string()));
        }

        let model = IntentModel::load(path).await?;
        tracing::info!(
            path = %path.display(),
            intents = model.len(),
            language = %self.language.short,
            "intent model loaded"
        );
        self.model = Some(model);
        Ok(())
    }

    /// Run the intent pipeline on a query
    ///
    /// # Errors
    ///
    /// Returns an `nlu` error if no model is loaded. An unmatched query is a
    /// normal `Understanding::NoMatch` result.
    pub async fn process(&self, text: &str) -> Result<Understanding> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::Nlu("intent model not loaded".to_string()))?;

        tokio::task::yield_now().await;

        Ok(model.classify(text).map_or(Understanding::NoMatch, |(intent, confidence)| {
            tracing::debug!(intent = %intent, confidence, "intent matched");
            Understanding::Match { intent, confidence }
        }))
    }
}
