//! Template Compilation Pipeline - turns a template into final file content.
//!
//! This service coordinates one generation:
//! 1. Compile the template with directive and import helpers
//! 2. Declaration pass against the static context (output discarded)
//! 3. Resolve the recorded directives with the interaction provider
//! 4. Final render with the answers layered on top
//! 5. (`generate` only) Write the result to the target
//!
//! Nothing is written unless every step succeeds.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, InteractionProvider, TemplateHelpers, TemplateRenderer},
        services::interactive::InteractiveSession,
    },
    domain::{Answers, BuiltinValues, RenderContext, Template},
    error::{StencilError, StencilResult},
};

/// Nesting limit for `import`; deeper chains are assumed to be cycles.
pub const MAX_IMPORT_DEPTH: usize = 16;

/// Backing for the `import` helper: reads sibling files and tracks nesting.
pub struct ImportResolver {
    filesystem: Arc<dyn Filesystem>,
    base_dir: PathBuf,
    depth: AtomicUsize,
}

impl std::fmt::Debug for ImportResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportResolver")
            .field("base_dir", &self.base_dir)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl ImportResolver {
    pub fn new(filesystem: Arc<dyn Filesystem>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            filesystem,
            base_dir: base_dir.into(),
            depth: AtomicUsize::new(0),
        }
    }

    /// Directory imports are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Enter one level of nesting. The returned guard leaves it again.
    pub fn enter(&self) -> StencilResult<ImportGuard<'_>> {
        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        let guard = ImportGuard { depth: &self.depth };
        if depth > MAX_IMPORT_DEPTH {
            return Err(ApplicationError::RenderingFailed {
                reason: format!(
                    "import nesting exceeds {MAX_IMPORT_DEPTH} levels (self-referencing template?)"
                ),
            }
            .into());
        }
        Ok(guard)
    }

    /// Read the template source at `relative` (relative to [`Self::base_dir`]).
    pub fn read(&self, relative: &str) -> StencilResult<String> {
        let path = self.base_dir.join(relative);
        debug!(path = %path.display(), "Importing");
        self.filesystem.read_text(&path)
    }
}

/// Decrements the import depth on drop.
#[derive(Debug)]
pub struct ImportGuard<'a> {
    depth: &'a AtomicUsize,
}

impl Drop for ImportGuard<'_> {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::SeqCst);
    }
}

/// What to do when the operator dismisses a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CancelPolicy {
    /// Fail with `Cancelled`; nothing is written.
    #[default]
    Abort,
    /// Bind the key to `null` and keep going.
    BindNull,
}

/// Result of a successful render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub content: String,
    pub answers: Answers,
}

/// Compiles, resolves and renders templates.
pub struct TemplatePipeline {
    renderer: Arc<dyn TemplateRenderer>,
    filesystem: Arc<dyn Filesystem>,
    interaction: Arc<dyn InteractionProvider>,
    variables: BTreeMap<String, String>,
    cancel_policy: CancelPolicy,
}

impl TemplatePipeline {
    pub fn new(
        renderer: Arc<dyn TemplateRenderer>,
        filesystem: Arc<dyn Filesystem>,
        interaction: Arc<dyn InteractionProvider>,
    ) -> Self {
        Self {
            renderer,
            filesystem,
            interaction,
            variables: BTreeMap::new(),
            cancel_policy: CancelPolicy::default(),
        }
    }

    /// Custom variables merged over the built-ins of every render.
    pub fn with_variables(mut self, variables: BTreeMap<String, String>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.cancel_policy = policy;
        self
    }

    /// Render `template` for a file to be created at `target`.
    pub async fn render(&self, template: &Template, target: &Path) -> StencilResult<RenderOutput> {
        self.render_with(template, BuiltinValues::for_target(target))
            .await
    }

    /// Render with explicitly computed built-ins.
    #[instrument(skip_all, fields(template = %template.name))]
    pub async fn render_with(
        &self,
        template: &Template,
        builtins: BuiltinValues,
    ) -> StencilResult<RenderOutput> {
        let (recorder, session) = InteractiveSession::declare();
        let helpers = TemplateHelpers::new(
            recorder,
            ImportResolver::new(self.filesystem.clone(), template.directory()),
        );

        // 1. Compile
        let compiled = self
            .renderer
            .compile(&template.name, &template.code, helpers)?;

        // 2. Declaration pass; errors here happen before any question.
        let context = RenderContext::new(builtins, &self.variables);
        compiled
            .render(&context)
            .map_err(|e| as_compile_failure(template, e))?;

        // 3. Resolve
        let answers = session.run(self.interaction.as_ref()).await?;
        debug!(answered = answers.len(), "Directives resolved");

        if answers.any_cancelled() && self.cancel_policy == CancelPolicy::Abort {
            return Err(ApplicationError::Cancelled {
                what: format!("question '{}'", answers.cancelled().join("', '")),
            }
            .into());
        }

        // 4. Final render
        let content = compiled.render(&context.with_answers(&answers))?;
        Ok(RenderOutput { content, answers })
    }

    /// Render and write the result to `target`, creating parent directories.
    ///
    /// Overwrites an existing file; callers gate that.
    #[instrument(skip_all, fields(template = %template.name, target = %target.display()))]
    pub async fn generate(&self, template: &Template, target: &Path) -> StencilResult<RenderOutput> {
        let output = self.render(template, target).await?;

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() && !self.filesystem.exists(parent) {
                self.filesystem.create_dir_all(parent)?;
            }
        }
        self.filesystem.write_text(target, &output.content)?;

        info!(bytes = output.content.len(), "File generated");
        Ok(output)
    }
}

fn as_compile_failure(template: &Template, err: StencilError) -> StencilError {
    match err {
        StencilError::Application(ApplicationError::RenderingFailed { reason }) => {
            ApplicationError::CompileFailed {
                template: template.name.clone(),
                reason,
            }
            .into()
        }
        other => other,
    }
}
