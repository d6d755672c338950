//! Terminal interaction provider.
//!
//! Questions are shown with `dialoguer` on a blocking task so the runtime
//! keeps servicing the catalog while the operator thinks. Esc or `q`
//! dismisses a choice; the pipeline's cancel policy decides what that means.

use std::io::IsTerminal as _;
use std::sync::Arc;

use stencil_adapters::PresetInteraction;
use stencil_core::application::ports::InteractionProvider;

use crate::error::{CliError, CliResult};

/// Provider for `stencil new`: `--set` answers first, then the terminal.
///
/// With `no_input` (or without a terminal) only the preset answers and
/// prompt defaults are used.
pub fn provider(
    preset: Vec<(String, String)>,
    no_input: bool,
) -> CliResult<Arc<dyn InteractionProvider>> {
    let preset = PresetInteraction::new(preset);
    if no_input || !std::io::stdin().is_terminal() {
        return Ok(Arc::new(preset));
    }
    Ok(Arc::new(preset.with_fallback(terminal()?)))
}

/// The terminal provider, if this build has one.
#[cfg(feature = "interactive")]
pub fn terminal() -> CliResult<Arc<dyn InteractionProvider>> {
    Ok(Arc::new(terminal::TerminalInteraction::new()))
}

#[cfg(not(feature = "interactive"))]
pub fn terminal() -> CliResult<Arc<dyn InteractionProvider>> {
    Err(CliError::FeatureNotAvailable {
        feature: "interactive",
    })
}

/// `true` when questions can be put to a person.
pub fn can_ask(no_input: bool) -> bool {
    !no_input && cfg!(feature = "interactive") && std::io::stdin().is_terminal()
}

/// Map a dismissed question to [`CliError::Cancelled`].
pub fn answered<T>(answer: Option<T>) -> CliResult<T> {
    answer.ok_or(CliError::Cancelled)
}

#[cfg(feature = "interactive")]
mod terminal {
    use async_trait::async_trait;
    use dialoguer::{Confirm, FuzzySelect, Input, MultiSelect, theme::ColorfulTheme};
    use serde_json::Value;
    use tracing::debug;

    use stencil_core::{
        application::{ApplicationError, ports::InteractionProvider},
        domain::{Interaction, InteractiveDirective},
        error::{StencilError, StencilResult},
    };

    /// Asks questions on the controlling terminal.
    #[derive(Debug, Default)]
    pub struct TerminalInteraction;

    impl TerminalInteraction {
        pub fn new() -> Self {
            Self
        }
    }

    #[async_trait]
    impl InteractionProvider for TerminalInteraction {
        async fn ask(&self, directive: &InteractiveDirective) -> StencilResult<Option<Value>> {
            let key = directive.key.clone();
            let interaction = directive.interaction.clone();
            debug!(key = %key, kind = %interaction.kind(), "Asking");

            let result = tokio::task::spawn_blocking(move || show(&interaction))
                .await
                .map_err(|e| StencilError::Internal {
                    message: format!("interaction task failed: {e}"),
                })?;

            result.map_err(|e| {
                ApplicationError::InteractionFailed {
                    key,
                    reason: e.to_string(),
                }
                .into()
            })
        }
    }

    fn show(interaction: &Interaction) -> dialoguer::Result<Option<Value>> {
        let theme = ColorfulTheme::default();
        match interaction {
            Interaction::Confirm { message } => Ok(Confirm::with_theme(&theme)
                .with_prompt(message)
                .default(true)
                .interact_opt()?
                .map(Value::Bool)),

            Interaction::Prompt { message, default } => {
                let mut input = Input::<String>::with_theme(&theme)
                    .with_prompt(message)
                    .allow_empty(true);
                if let Some(default) = default {
                    input = input.default(default.clone());
                }
                Ok(Some(Value::String(input.interact_text()?)))
            }

            Interaction::Select { message, choices } => {
                let picked = FuzzySelect::with_theme(&theme)
                    .with_prompt(message)
                    .items(choices)
                    .default(0)
                    .interact_opt()?;
                Ok(picked.and_then(|i| choices.get(i)).cloned().map(Value::String))
            }

            Interaction::MultiSelect { message, choices }
            | Interaction::MultiSelectNative { message, choices } => {
                let picked = MultiSelect::with_theme(&theme)
                    .with_prompt(message)
                    .items(choices)
                    .interact_opt()?;
                Ok(picked.map(|indices| {
                    Value::Array(
                        indices
                            .into_iter()
                            .filter_map(|i| choices.get(i).cloned())
                            .map(Value::String)
                            .collect(),
                    )
                }))
            }

            Interaction::MultiPath { message, filters } => {
                let prompt = if filters.is_empty() {
                    format!("{message} (comma-separated paths)")
                } else {
                    format!("{message} (comma-separated .{} paths)", filters.join("/."))
                };
                let filters = filters.clone();
                let raw = Input::<String>::with_theme(&theme)
                    .with_prompt(prompt)
                    .allow_empty(true)
                    .validate_with(move |raw: &String| -> Result<(), String> {
                        match split_paths(raw).find(|p| !matches_filters(p, &filters)) {
                            Some(path) => Err(format!("'{path}' does not match the filters")),
                            None => Ok(()),
                        }
                    })
                    .interact_text()?;
                Ok(Some(Value::Array(
                    split_paths(&raw).map(|p| Value::String(p.to_string())).collect(),
                )))
            }
        }
    }

    fn split_paths(raw: &str) -> impl Iterator<Item = &str> {
        raw.split(',').map(str::trim).filter(|p| !p.is_empty())
    }

    fn matches_filters(path: &str, filters: &[String]) -> bool {
        filters.is_empty()
            || std::path::Path::new(path)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| filters.iter().any(|f| f == ext))
    }

}
