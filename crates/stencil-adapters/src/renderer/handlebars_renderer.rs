//! Handlebars renderer.
//!
//! Every compile gets its own registry so helpers can be bound to that
//! compile's directive recorder and import resolver.
//!
//! ## Helpers
//!
//! | Template syntax                                  | Effect |
//! |--------------------------------------------------|--------|
//! | `{{confirm "key" "Message?"}}`                   | declare a yes/no question |
//! | `{{prompt "key" "Message?" default="x"}}`        | declare a free-text question |
//! | `{{select "key" "Message?" "a" "b"}}`            | declare a single choice |
//! | `{{multiselect "key" "Message?" "a" "b"}}`       | declare a multiple choice |
//! | `{{multiselect_native "key" "Message?" "a"}}`    | multiple choice, native picker |
//! | `{{multi_path "key" "Message?" "rs" "toml"}}`    | pick files, filtered by extension |
//! | `{{import "partials/header.hbs"}}`               | render a sibling file inline |
//!
//! Directive helpers always render as the empty string. Output is never
//! HTML-escaped.

use std::sync::Arc;

use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext as HbsRenderContext,
    RenderError, RenderErrorReason,
};
use serde_json::Value;
use tracing::instrument;

use stencil_core::{
    application::{
        ApplicationError,
        ports::{CompiledTemplate, TemplateHelpers, TemplateRenderer},
        services::{DirectiveRecorder, ImportResolver},
    },
    domain::{InteractionKind, RenderContext},
    error::StencilResult,
};

const IMPORT_HELPER: &str = "import";

/// Template renderer backed by the `handlebars` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlebarsRenderer {
    strict: bool,
}

impl HandlebarsRenderer {
    /// Create a lenient renderer: missing variables render as empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on references to missing variables instead of rendering them empty.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    #[instrument(skip(self, source, helpers))]
    fn compile(
        &self,
        name: &str,
        source: &str,
        helpers: TemplateHelpers,
    ) -> StencilResult<Box<dyn CompiledTemplate>> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(self.strict);

        for kind in InteractionKind::ALL {
            register_directive(&mut registry, kind, helpers.directives.clone());
        }
        register_import(&mut registry, helpers.imports.clone());

        registry
            .register_template_string(name, source)
            .map_err(|e| ApplicationError::CompileFailed {
                template: name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Box::new(HandlebarsTemplate {
            registry,
            name: name.to_string(),
        }))
    }
}

/// A template parsed into its own registry.
struct HandlebarsTemplate {
    registry: Handlebars<'static>,
    name: String,
}

impl CompiledTemplate for HandlebarsTemplate {
    fn render(&self, context: &RenderContext) -> StencilResult<String> {
        self.registry
            .render(&self.name, &context.to_value())
            .map_err(|e| {
                ApplicationError::RenderingFailed {
                    reason: e.to_string(),
                }
                .into()
            })
    }
}

fn other(message: impl ToString) -> RenderError {
    RenderErrorReason::Other(message.to_string()).into()
}

fn string_param(h: &Helper<'_>, index: usize, what: &str) -> Result<String, RenderError> {
    h.param(index)
        .and_then(|p| p.value().as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            other(format!(
                "{{{{{}}}}} expects a string {} as argument {}",
                h.name(),
                what,
                index + 1
            ))
        })
}

/// Positional arguments after the message. Array arguments are flattened so
/// choices may also come from a variable.
fn rest_params(h: &Helper<'_>) -> Vec<String> {
    h.params()
        .iter()
        .skip(2)
        .flat_map(|p| match p.value() {
            Value::Array(items) => items.iter().map(value_to_string).collect::<Vec<_>>(),
            value => vec![value_to_string(value)],
        })
        .collect()
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn register_directive(
    registry: &mut Handlebars<'static>,
    kind: InteractionKind,
    recorder: DirectiveRecorder,
) {
    registry.register_helper(
        kind.helper_name(),
        Box::new(
            move |h: &Helper,
                  _: &Handlebars,
                  _: &Context,
                  _: &mut HbsRenderContext,
                  out: &mut dyn Output|
                  -> HelperResult {
                let key = string_param(h, 0, "key")?;
                let message = string_param(h, 1, "message")?;
                let default = h
                    .hash_get("default")
                    .map(|v| value_to_string(v.value()));
                let placeholder = recorder
                    .declare_kind(kind, &key, &message, rest_params(h), default)
                    .map_err(other)?;
                out.write(&placeholder)?;
                Ok(())
            },
        ),
    );
}

fn register_import(registry: &mut Handlebars<'static>, imports: Arc<ImportResolver>) {
    registry.register_helper(
        IMPORT_HELPER,
        Box::new(
            move |h: &Helper,
                  r: &Handlebars,
                  ctx: &Context,
                  _: &mut HbsRenderContext,
                  out: &mut dyn Output|
                  -> HelperResult {
                let relative = string_param(h, 0, "path")?;
                let _depth = imports.enter().map_err(other)?;
                let source = imports.read(&relative).map_err(other)?;
                let rendered = r.render_template_with_context(&source, ctx)?;
                out.write(&rendered)?;
                Ok(())
            },
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFilesystem;
    use serde_json::{Map, json};
    use stencil_core::application::services::InteractiveSession;

    fn helpers(fs: MemoryFilesystem) -> (TemplateHelpers, InteractiveSession) {
        let (recorder, session) = InteractiveSession::declare();
        let imports = ImportResolver::new(Arc::new(fs), "/ws/t");
        (TemplateHelpers::new(recorder, imports), session)
    }

    fn context(value: Value) -> RenderContext {
        match value {
            Value::Object(map) => RenderContext::from_map(map),
            _ => RenderContext::from_map(Map::new()),
        }
    }

    #[test]
    fn substitutes_variables_without_escaping() {
        let (h, _) = helpers(MemoryFilesystem::new());
        let t = HandlebarsRenderer::new()
            .compile("t", "Hello, {{NAME}}! <{{T}}>", h)
            .unwrap();
        let out = t.render(&context(json!({"NAME": "Ada", "T": "Vec<u8>"}))).unwrap();
        assert_eq!(out, "Hello, Ada! <Vec<u8>>");
    }

    #[test]
    fn malformed_source_is_compile_failure() {
        let (h, _) = helpers(MemoryFilesystem::new());
        let err = HandlebarsRenderer::new()
            .compile("broken", "{{#if x}}never closed", h)
            .err()
            .unwrap();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn directives_record_and_render_empty() {
        let (h, session) = helpers(MemoryFilesystem::new());
        let t = HandlebarsRenderer::new()
            .compile(
                "t",
                r#"A{{confirm "doTests" "Add tests?"}}B{{select "lang" "Language?" "rs" "ts"}}C{{prompt "title" "Title?" default="Untitled"}}"#,
                h,
            )
            .unwrap();
        assert_eq!(t.render(&context(json!({}))).unwrap(), "ABC");

        let directives = session.directives().unwrap();
        assert_eq!(directives.keys(), vec!["doTests", "lang", "title"]);
        assert_eq!(
            directives.get("lang").unwrap().interaction,
            stencil_core::domain::Interaction::Select {
                message: "Language?".into(),
                choices: vec!["rs".into(), "ts".into()],
            }
        );
        assert_eq!(
            directives.get("title").unwrap().interaction,
            stencil_core::domain::Interaction::Prompt {
                message: "Title?".into(),
                default: Some("Untitled".into()),
            }
        );
    }

    #[test]
    fn directive_without_message_fails_render() {
        let (h, _) = helpers(MemoryFilesystem::new());
        let t = HandlebarsRenderer::new()
            .compile("t", r#"{{confirm "doTests"}}"#, h)
            .unwrap();
        assert!(t.render(&context(json!({}))).is_err());
    }

    #[test]
    fn import_renders_sibling_with_current_context() {
        let fs = MemoryFilesystem::new();
        fs.insert("/ws/t/partials/header.hbs", "// {{name}} by {{user}}");
        let (h, _) = helpers(fs);
        let t = HandlebarsRenderer::new()
            .compile("t", "{{import \"partials/header.hbs\"}}\nbody", h)
            .unwrap();
        let out = t
            .render(&context(json!({"name": "app", "user": "ada"})))
            .unwrap();
        assert_eq!(out, "// app by ada\nbody");
    }

    #[test]
    fn self_import_stops_at_depth_limit() {
        let fs = MemoryFilesystem::new();
        fs.insert("/ws/t/loop.hbs", "x{{import \"loop.hbs\"}}");
        let (h, _) = helpers(fs);
        let t = HandlebarsRenderer::new()
            .compile("t", "{{import \"loop.hbs\"}}", h)
            .unwrap();
        let err = t.render(&context(json!({}))).unwrap_err();
        assert!(err.to_string().contains("import nesting"));
    }

    #[test]
    fn strict_mode_rejects_missing_variables() {
        let (h, _) = helpers(MemoryFilesystem::new());
        let t = HandlebarsRenderer::new()
            .strict(true)
            .compile("t", "{{missing}}", h)
            .unwrap();
        assert!(t.render(&context(json!({}))).is_err());
    }
}
