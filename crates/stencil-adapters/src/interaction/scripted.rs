//! Scripted interaction provider for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use stencil_core::{
    application::{ApplicationError, ports::InteractionProvider},
    domain::InteractiveDirective,
    error::StencilResult,
};

#[derive(Debug, Clone)]
enum Reply {
    Answer(Value),
    Cancel,
    Fail(String),
}

#[derive(Debug, Default)]
struct ScriptedInner {
    replies: HashMap<String, Reply>,
    asked: Vec<InteractiveDirective>,
}

/// Replies by key and records every question asked, in order.
///
/// Cheap to clone; clones share the script and the record. An unscripted
/// key fails the interaction.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInteraction {
    inner: Arc<Mutex<ScriptedInner>>,
}

impl ScriptedInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(self, key: &str, reply: Reply) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.replies.insert(key.to_string(), reply);
        }
        self
    }

    pub fn answer(self, key: &str, value: Value) -> Self {
        self.script(key, Reply::Answer(value))
    }

    /// Dismiss the question for `key`.
    pub fn cancel(self, key: &str) -> Self {
        self.script(key, Reply::Cancel)
    }

    /// Fail the interaction for `key`.
    pub fn fail(self, key: &str, reason: &str) -> Self {
        self.script(key, Reply::Fail(reason.to_string()))
    }

    /// Every directive asked so far.
    pub fn asked(&self) -> Vec<InteractiveDirective> {
        self.inner
            .lock()
            .map(|i| i.asked.clone())
            .unwrap_or_default()
    }

    pub fn asked_keys(&self) -> Vec<String> {
        self.asked().into_iter().map(|d| d.key).collect()
    }
}

#[async_trait]
impl InteractionProvider for ScriptedInteraction {
    async fn ask(&self, directive: &InteractiveDirective) -> StencilResult<Option<Value>> {
        let reply = {
            let mut inner = self
                .inner
                .lock()
                .map_err(|_| ApplicationError::StoreLockError)?;
            inner.asked.push(directive.clone());
            inner.replies.get(&directive.key).cloned()
        };

        match reply {
            Some(Reply::Answer(value)) => Ok(Some(value)),
            Some(Reply::Cancel) => Ok(None),
            Some(Reply::Fail(reason)) => Err(ApplicationError::InteractionFailed {
                key: directive.key.clone(),
                reason,
            }
            .into()),
            None => Err(ApplicationError::InteractionFailed {
                key: directive.key.clone(),
                reason: "no scripted reply".into(),
            }
            .into()),
        }
    }
}
