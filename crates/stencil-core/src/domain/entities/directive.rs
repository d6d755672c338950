//! Interactive directives.
//!
//! A directive is a question a template declares while it is being
//! compiled: "bind the answer to *key* by asking *interaction*". Directives
//! are recorded first and resolved later, in declaration order.
//!
//! The set of interaction kinds is closed, so arguments are modelled as a
//! tagged union ([`Interaction`]) rather than a kind string plus a bag of
//! untyped values.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::error::DomainError;

/// The fixed set of interaction kinds a template may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionKind {
    Confirm,
    Prompt,
    Select,
    MultiSelect,
    MultiSelectNative,
    MultiPath,
}

impl InteractionKind {
    /// All kinds, in the order helpers are registered.
    pub const ALL: [InteractionKind; 6] = [
        Self::Confirm,
        Self::Prompt,
        Self::Select,
        Self::MultiSelect,
        Self::MultiSelectNative,
        Self::MultiPath,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Prompt => "prompt",
            Self::Select => "select",
            Self::MultiSelect => "multiselect",
            Self::MultiSelectNative => "multiselect-native",
            Self::MultiPath => "multi-path",
        }
    }

    /// Identifier usable as a helper name in template syntax
    /// (`multiselect-native` becomes `multiselect_native`).
    pub fn helper_name(&self) -> &'static str {
        match self {
            Self::MultiSelectNative => "multiselect_native",
            Self::MultiPath => "multi_path",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s || k.helper_name() == s)
            .ok_or_else(|| DomainError::UnknownInteractionKind(s.to_string()))
    }
}

/// A question plus its kind-specific arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Interaction {
    Confirm {
        message: String,
    },
    Prompt {
        message: String,
        default: Option<String>,
    },
    Select {
        message: String,
        choices: Vec<String>,
    },
    MultiSelect {
        message: String,
        choices: Vec<String>,
    },
    MultiSelectNative {
        message: String,
        choices: Vec<String>,
    },
    MultiPath {
        message: String,
        /// File extensions offered as filters, without dots.
        filters: Vec<String>,
    },
}

impl Interaction {
    /// Build an interaction from positional template arguments.
    ///
    /// `rest` holds everything after the message: choices for the select
    /// kinds, filters for `multi-path`, and is ignored by `confirm`.
    /// `default` is only meaningful for `prompt`.
    pub fn from_args(
        kind: InteractionKind,
        message: String,
        rest: Vec<String>,
        default: Option<String>,
    ) -> Self {
        match kind {
            InteractionKind::Confirm => Self::Confirm { message },
            InteractionKind::Prompt => Self::Prompt { message, default },
            InteractionKind::Select => Self::Select {
                message,
                choices: rest,
            },
            InteractionKind::MultiSelect => Self::MultiSelect {
                message,
                choices: rest,
            },
            InteractionKind::MultiSelectNative => Self::MultiSelectNative {
                message,
                choices: rest,
            },
            InteractionKind::MultiPath => Self::MultiPath {
                message,
                filters: rest,
            },
        }
    }

    pub fn kind(&self) -> InteractionKind {
        match self {
            Self::Confirm { .. } => InteractionKind::Confirm,
            Self::Prompt { .. } => InteractionKind::Prompt,
            Self::Select { .. } => InteractionKind::Select,
            Self::MultiSelect { .. } => InteractionKind::MultiSelect,
            Self::MultiSelectNative { .. } => InteractionKind::MultiSelectNative,
            Self::MultiPath { .. } => InteractionKind::MultiPath,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Confirm { message }
            | Self::Prompt { message, .. }
            | Self::Select { message, .. }
            | Self::MultiSelect { message, .. }
            | Self::MultiSelectNative { message, .. }
            | Self::MultiPath { message, .. } => message,
        }
    }
}

/// A deferred question declared during template compilation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractiveDirective {
    /// Parameter name the answer is bound to.
    pub key: String,
    pub interaction: Interaction,
}

impl InteractiveDirective {
    pub fn new(key: impl Into<String>, interaction: Interaction) -> Self {
        Self {
            key: key.into(),
            interaction,
        }
    }

    pub fn kind(&self) -> InteractionKind {
        self.interaction.kind()
    }
}

/// Ordered association list of directives keyed by directive key.
///
/// Re-registering a key replaces the directive in its original slot, so
/// execution order is the order of *first* declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectiveRegistry {
    entries: Vec<InteractiveDirective>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Returns `true` if the key was new.
    pub fn register(&mut self, directive: InteractiveDirective) -> bool {
        match self.entries.iter_mut().find(|d| d.key == directive.key) {
            Some(slot) => {
                *slot = directive;
                false
            }
            None => {
                self.entries.push(directive);
                true
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&InteractiveDirective> {
        self.entries.iter().find(|d| d.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InteractiveDirective> {
        self.entries.iter()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of resolving a directive registry.
///
/// Every declared key is present in `values`; cancelled prompts bind to
/// `null` and are also listed in `cancelled`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers {
    values: Map<String, Value>,
    cancelled: Vec<String>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn cancel(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.values.insert(key.clone(), Value::Null);
        self.cancelled.push(key);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn cancelled(&self) -> &[String] {
        &self.cancelled
    }

    pub fn any_cancelled(&self) -> bool {
        !self.cancelled.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Map<String, Value> {
        self.values
    }
}
