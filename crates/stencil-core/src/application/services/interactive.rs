//! Interactive resolution protocol.
//!
//! Templates ask the operator for values through directive helpers. Asking
//! is split in two passes so the questions are exactly the ones the concrete
//! template references, each is asked once, and a cancellation is known
//! before any file is touched:
//!
//! 1. **declare**: while the template is compiled, every directive helper
//!    call lands in [`DirectiveRecorder`]. Nothing is asked; the helper
//!    renders as an empty string.
//! 2. **run**: [`InteractiveSession::run`] walks the recorded directives in
//!    first-declaration order and awaits the provider for each, one at a time.
//!
//! ```rust,no_run
//! # use stencil_core::application::services::interactive::InteractiveSession;
//! # async fn demo(provider: &dyn stencil_core::application::ports::InteractionProvider)
//! #     -> stencil_core::error::StencilResult<()> {
//! let (context, session) = InteractiveSession::declare();
//! context.confirm("doTests", "Add tests?")?;   // recorded, returns ""
//! let answers = session.run(provider).await?;   // asked now
//! # let _ = answers; Ok(()) }
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, instrument};

use crate::{
    application::{ApplicationError, ports::InteractionProvider},
    domain::{
        Answers, DirectiveRegistry, DomainValidator as validator, Interaction, InteractionKind,
        InteractiveDirective,
    },
    error::{StencilError, StencilResult},
};

#[derive(Debug, Default)]
struct RecorderState {
    registry: DirectiveRegistry,
    sealed: bool,
}

/// The `context` object templates declare directives through.
///
/// Cheap to clone; clones share one registry.
#[derive(Debug, Clone, Default)]
pub struct DirectiveRecorder {
    state: Arc<Mutex<RecorderState>>,
}

impl DirectiveRecorder {
    fn lock(&self) -> StencilResult<MutexGuard<'_, RecorderState>> {
        self.state
            .lock()
            .map_err(|_| StencilError::from(ApplicationError::StoreLockError))
    }

    /// Record `directive` (overwriting an earlier one with the same key) and
    /// return the empty placeholder the template renders in its place.
    ///
    /// Once sealed, declarations are validated but otherwise ignored.
    pub fn declare(&self, directive: InteractiveDirective) -> StencilResult<String> {
        validator::validate_directive(&directive)?;

        let mut state = self.lock()?;
        if state.sealed {
            debug!(key = %directive.key, "Directive declared after resolution; ignored");
            return Ok(String::new());
        }

        let kind = directive.kind();
        let key = directive.key.clone();
        let fresh = state.registry.register(directive);
        debug!(%key, %kind, fresh, "Directive recorded");
        Ok(String::new())
    }

    /// Record a directive from template arguments.
    pub fn declare_kind(
        &self,
        kind: InteractionKind,
        key: &str,
        message: &str,
        rest: Vec<String>,
        default: Option<String>,
    ) -> StencilResult<String> {
        let interaction = Interaction::from_args(kind, message.to_string(), rest, default);
        self.declare(InteractiveDirective::new(key, interaction))
    }

    /// Record a yes/no question; the answer binds as `true` or `false`.
    pub fn confirm(&self, key: &str, message: &str) -> StencilResult<String> {
        self.declare_kind(InteractionKind::Confirm, key, message, Vec::new(), None)
    }

    /// Record a free-text question, pre-filled with `default` when given.
    pub fn prompt(&self, key: &str, message: &str, default: Option<&str>) -> StencilResult<String> {
        self.declare_kind(
            InteractionKind::Prompt,
            key,
            message,
            Vec::new(),
            default.map(str::to_string),
        )
    }

    /// Record a single choice from `choices`.
    pub fn select(&self, key: &str, message: &str, choices: &[&str]) -> StencilResult<String> {
        self.declare_kind(InteractionKind::Select, key, message, owned(choices), None)
    }

    /// Record a pick of any number of `choices`.
    pub fn multiselect(&self, key: &str, message: &str, choices: &[&str]) -> StencilResult<String> {
        self.declare_kind(InteractionKind::MultiSelect, key, message, owned(choices), None)
    }

    /// Record a pick of any number of `choices` using the host's own
    /// multi-select widget.
    pub fn multiselect_native(
        &self,
        key: &str,
        message: &str,
        choices: &[&str],
    ) -> StencilResult<String> {
        self.declare_kind(
            InteractionKind::MultiSelectNative,
            key,
            message,
            owned(choices),
            None,
        )
    }

    /// Record a selection of files, offering `filters` as extensions.
    pub fn multi_path(&self, key: &str, message: &str, filters: &[&str]) -> StencilResult<String> {
        self.declare_kind(InteractionKind::MultiPath, key, message, owned(filters), None)
    }

    /// Stop accepting declarations.
    pub fn seal(&self) -> StencilResult<()> {
        self.lock()?.sealed = true;
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.lock().map(|s| s.sealed).unwrap_or(true)
    }

    /// Copy of the directives recorded so far.
    pub fn snapshot(&self) -> StencilResult<DirectiveRegistry> {
        Ok(self.lock()?.registry.clone())
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Owns the `run` half of the protocol.
#[derive(Debug)]
pub struct InteractiveSession {
    recorder: DirectiveRecorder,
}

impl InteractiveSession {
    /// Start a session: returns the recorder to hand to the template and the
    /// session that later resolves what was recorded.
    pub fn declare() -> (DirectiveRecorder, InteractiveSession) {
        let recorder = DirectiveRecorder::default();
        let session = InteractiveSession {
            recorder: recorder.clone(),
        };
        (recorder, session)
    }

    /// Directives recorded so far.
    pub fn directives(&self) -> StencilResult<DirectiveRegistry> {
        self.recorder.snapshot()
    }

    /// Seal the recorder and ask every directive, strictly one after another.
    ///
    /// A dismissed question binds `null`. A provider error stops the run and
    /// discards every answer collected so far.
    #[instrument(skip_all)]
    pub async fn run(&self, provider: &dyn InteractionProvider) -> StencilResult<Answers> {
        self.recorder.seal()?;
        let directives = self.recorder.snapshot()?;

        let mut answers = Answers::new();
        for directive in directives.iter() {
            debug!(key = %directive.key, kind = %directive.kind(), "Asking");
            match provider.ask(directive).await? {
                Some(value) => answers.answer(directive.key.clone(), value),
                None => {
                    debug!(key = %directive.key, "Question dismissed");
                    answers.cancel(directive.key.clone());
                }
            }
        }

        Ok(answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockInteractionProvider;
    use mockall::{Sequence, predicate::function};
    use serde_json::{Value, json};

    #[tokio::test]
    async fn declaring_never_asks_and_returns_placeholder() {
        let (context, session) = InteractiveSession::declare();
        let mut provider = MockInteractionProvider::new();
        provider.expect_ask().never();

        assert_eq!(context.confirm("doTests", "Add tests?").unwrap(), "");
        assert_eq!(session.directives().unwrap().len(), 1);
    }

    #[test]
    fn each_helper_records_its_kind() {
        let (context, session) = InteractiveSession::declare();
        context.confirm("a", "A?").unwrap();
        context.prompt("b", "B?", Some("bee")).unwrap();
        context.select("c", "C?", &["x"]).unwrap();
        context.multiselect("d", "D?", &["x", "y"]).unwrap();
        context.multiselect_native("e", "E?", &["x", "y"]).unwrap();
        context.multi_path("f", "F?", &["rs", "toml"]).unwrap();

        let directives = session.directives().unwrap();
        let kinds: Vec<_> = directives.iter().map(|d| d.kind()).collect();
        assert_eq!(kinds, InteractionKind::ALL);

        let last = directives.iter().last().unwrap();
        assert_eq!(
            last.interaction,
            Interaction::MultiPath {
                message: "F?".into(),
                filters: vec!["rs".into(), "toml".into()],
            }
        );
    }

    #[tokio::test]
    async fn run_with_no_directives_never_asks() {
        let (_context, session) = InteractiveSession::declare();
        let mut provider = MockInteractionProvider::new();
        provider.expect_ask().never();

        let answers = session.run(&provider).await.unwrap();
        assert!(answers.is_empty());
    }

    #[tokio::test]
    async fn duplicate_key_is_asked_once() {
        let (context, session) = InteractiveSession::declare();
        context.confirm("doTests", "Add tests?").unwrap();
        context.confirm("doTests", "Add tests?").unwrap();

        let mut provider = MockInteractionProvider::new();
        provider
            .expect_ask()
            .times(1)
            .returning(|_| Ok(Some(Value::Bool(true))));

        let answers = session.run(&provider).await.unwrap();
        assert_eq!(answers.get("doTests"), Some(&Value::Bool(true)));
    }

    #[tokio::test]
    async fn runs_in_first_declaration_order() {
        let (context, session) = InteractiveSession::declare();
        context.prompt("b", "B?", None).unwrap();
        context.select("a", "A?", &["x", "y"]).unwrap();
        context.prompt("b", "B again?", Some("dflt")).unwrap();

        let mut seq = Sequence::new();
        let mut provider = MockInteractionProvider::new();
        provider
            .expect_ask()
            .with(function(|d: &InteractiveDirective| {
                d.key == "b" && d.interaction.message() == "B again?"
            }))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(json!("bee"))));
        provider
            .expect_ask()
            .with(function(|d: &InteractiveDirective| d.key == "a"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(json!("x"))));

        let answers = session.run(&provider).await.unwrap();
        assert_eq!(answers.get("b"), Some(&json!("bee")));
        assert_eq!(answers.get("a"), Some(&json!("x")));
    }

    #[tokio::test]
    async fn dismissed_question_binds_null() {
        let (context, session) = InteractiveSession::declare();
        context.prompt("title", "Title?", None).unwrap();

        let mut provider = MockInteractionProvider::new();
        provider.expect_ask().returning(|_| Ok(None));

        let answers = session.run(&provider).await.unwrap();
        assert_eq!(answers.get("title"), Some(&Value::Null));
        assert_eq!(answers.cancelled(), ["title".to_string()]);
    }

    #[tokio::test]
    async fn provider_error_aborts_remaining_directives() {
        let (context, session) = InteractiveSession::declare();
        context.confirm("first", "First?").unwrap();
        context.confirm("second", "Second?").unwrap();

        let mut provider = MockInteractionProvider::new();
        provider
            .expect_ask()
            .with(function(|d: &InteractiveDirective| d.key == "first"))
            .times(1)
            .returning(|d| {
                Err(ApplicationError::InteractionFailed {
                    key: d.key.clone(),
                    reason: "terminal closed".into(),
                }
                .into())
            });
        provider
            .expect_ask()
            .with(function(|d: &InteractiveDirective| d.key == "second"))
            .never();

        let err = session.run(&provider).await.unwrap_err();
        assert!(matches!(
            err,
            StencilError::Application(ApplicationError::InteractionFailed { .. })
        ));
    }

    #[test]
    fn sealed_recorder_ignores_new_declarations() {
        let (context, _session) = InteractiveSession::declare();
        context.confirm("a", "A?").unwrap();
        context.seal().unwrap();
        assert_eq!(context.confirm("b", "B?").unwrap(), "");
        assert!(context.is_sealed());
        assert_eq!(context.snapshot().unwrap().keys(), vec!["a"]);
    }

    #[test]
    fn invalid_directive_is_rejected() {
        let (context, _session) = InteractiveSession::declare();
        assert!(context.confirm("", "A?").is_err());
        assert!(context.confirm("ok", "").is_err());
    }
}
