//! Answers supplied up front (e.g. `--set KEY=VALUE`).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use stencil_core::{
    application::{ApplicationError, ports::InteractionProvider},
    domain::{Interaction, InteractiveDirective},
    error::StencilResult,
};

/// Answers directives from a fixed map, deferring the rest to `fallback`.
///
/// Without a fallback an unanswered prompt takes its default; any other
/// unanswered directive fails the interaction.
pub struct PresetInteraction {
    answers: HashMap<String, String>,
    fallback: Option<Arc<dyn InteractionProvider>>,
}

impl PresetInteraction {
    pub fn new(answers: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            fallback: None,
        }
    }

    /// Ask `fallback` for every directive without a preset answer.
    pub fn with_fallback(mut self, fallback: Arc<dyn InteractionProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

/// Convert a textual answer to the value type the directive produces.
pub fn coerce_answer(interaction: &Interaction, raw: &str) -> Result<Value, String> {
    match interaction {
        Interaction::Confirm { .. } => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "on" => Ok(Value::Bool(true)),
            "false" | "no" | "n" | "0" | "off" => Ok(Value::Bool(false)),
            other => Err(format!("'{other}' is not a yes/no answer")),
        },
        Interaction::Prompt { .. } => Ok(Value::String(raw.to_string())),
        Interaction::Select { choices, .. } => {
            if choices.is_empty() || choices.iter().any(|c| c == raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(format!("'{raw}' is not one of: {}", choices.join(", ")))
            }
        }
        Interaction::MultiSelect { choices, .. } | Interaction::MultiSelectNative { choices, .. } => {
            let picked = split_list(raw);
            match picked.iter().find(|p| !choices.is_empty() && !choices.contains(p)) {
                Some(unknown) => Err(format!(
                    "'{unknown}' is not one of: {}",
                    choices.join(", ")
                )),
                None => Ok(Value::Array(picked.into_iter().map(Value::String).collect())),
            }
        }
        Interaction::MultiPath { .. } => Ok(Value::Array(
            split_list(raw).into_iter().map(Value::String).collect(),
        )),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl InteractionProvider for PresetInteraction {
    async fn ask(&self, directive: &InteractiveDirective) -> StencilResult<Option<Value>> {
        if let Some(raw) = self.answers.get(&directive.key) {
            debug!(key = %directive.key, "Using preset answer");
            let value = coerce_answer(&directive.interaction, raw).map_err(|reason| {
                ApplicationError::InteractionFailed {
                    key: directive.key.clone(),
                    reason,
                }
            })?;
            return Ok(Some(value));
        }

        if let Some(fallback) = &self.fallback {
            return fallback.ask(directive).await;
        }

        match &directive.interaction {
            Interaction::Prompt {
                default: Some(default),
                ..
            } => Ok(Some(Value::String(default.clone()))),
            _ => Err(ApplicationError::InteractionFailed {
                key: directive.key.clone(),
                reason: "no answer provided".into(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn directive(key: &str, interaction: Interaction) -> InteractiveDirective {
        InteractiveDirective::new(key, interaction)
    }

    fn confirm() -> Interaction {
        Interaction::Confirm {
            message: "Add tests?".into(),
        }
    }

    #[tokio::test]
    async fn preset_answers_are_coerced() {
        let preset = PresetInteraction::new([
            ("doTests".to_string(), "yes".to_string()),
            ("features".to_string(), "a, b".to_string()),
        ]);
        let answer = preset.ask(&directive("doTests", confirm())).await.unwrap();
        assert_eq!(answer, Some(json!(true)));

        let multi = Interaction::MultiSelect {
            message: "Features?".into(),
            choices: vec!["a".into(), "b".into(), "c".into()],
        };
        let answer = preset.ask(&directive("features", multi)).await.unwrap();
        assert_eq!(answer, Some(json!(["a", "b"])));
    }

    #[tokio::test]
    async fn invalid_choice_fails() {
        let preset = PresetInteraction::new([("lang".to_string(), "go".to_string())]);
        let select = Interaction::Select {
            message: "Language?".into(),
            choices: vec!["rs".into(), "ts".into()],
        };
        assert!(preset.ask(&directive("lang", select)).await.is_err());
    }

    #[tokio::test]
    async fn unanswered_prompt_uses_default_otherwise_fails() {
        let preset = PresetInteraction::new([]);
        let prompt = Interaction::Prompt {
            message: "Title?".into(),
            default: Some("Untitled".into()),
        };
        assert_eq!(
            preset.ask(&directive("title", prompt)).await.unwrap(),
            Some(json!("Untitled"))
        );
        assert!(preset.ask(&directive("doTests", confirm())).await.is_err());
    }

    #[tokio::test]
    async fn unanswered_goes_to_fallback() {
        let fallback = crate::interaction::ScriptedInteraction::new().answer("doTests", json!(false));
        let preset = PresetInteraction::new([]).with_fallback(Arc::new(fallback.clone()));
        assert_eq!(
            preset.ask(&directive("doTests", confirm())).await.unwrap(),
            Some(json!(false))
        );
        assert_eq!(fallback.asked_keys(), ["doTests"]);
    }
}
