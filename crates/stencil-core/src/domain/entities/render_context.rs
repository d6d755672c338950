//! Render context: the flat key/value mapping fed to a compiled template.
//!
//! Layers, later overriding earlier:
//!
//! | Layer | Source |
//! |-------|--------|
//! | 1 | built-ins computed from the target path, OS user and clock |
//! | 2 | custom variables from configuration |
//! | 3 | interactive answers |
//!
//! ## Built-in Variables
//!
//! | Variable   | Example (`/ws/src/app.ts`) |
//! |------------|----------------------------|
//! | `dir`      | `/ws/src`                  |
//! | `dirName`  | `src`                      |
//! | `fileName` | `app.ts`                   |
//! | `path`     | `/ws/src/app.ts`           |
//! | `name`     | `app`                      |
//! | `user`     | `ada`                      |
//! | `date`     | `2026-10-16T09:41`         |

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Local, TimeZone};
use serde_json::{Map, Value};

use crate::domain::entities::directive::Answers;

/// Format for the `date` built-in: local time truncated to the minute.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Values computed from the generation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinValues {
    pub dir: String,
    pub dir_name: String,
    pub file_name: String,
    pub path: String,
    pub name: String,
    pub user: String,
    pub date: String,
}

impl BuiltinValues {
    /// Compute built-ins for `target` using the current user and clock.
    pub fn for_target(target: &Path) -> Self {
        Self::with(target, current_user(), &Local::now())
    }

    /// Compute built-ins with an explicit user and timestamp.
    pub fn with<Tz: TimeZone>(target: &Path, user: impl Into<String>, now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let dir = target.parent().unwrap_or_else(|| Path::new(""));
        let file_name = lossy(target.file_name());
        let name = target
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());

        Self {
            dir: dir.display().to_string(),
            dir_name: lossy(dir.file_name()),
            file_name,
            path: target.display().to_string(),
            name,
            user: user.into(),
            date: now.format(DATE_FORMAT).to_string(),
        }
    }

    fn into_map(self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("dir".into(), Value::String(self.dir));
        map.insert("dirName".into(), Value::String(self.dir_name));
        map.insert("fileName".into(), Value::String(self.file_name));
        map.insert("path".into(), Value::String(self.path));
        map.insert("name".into(), Value::String(self.name));
        map.insert("user".into(), Value::String(self.user));
        map.insert("date".into(), Value::String(self.date));
        map
    }
}

fn lossy(part: Option<&std::ffi::OsStr>) -> String {
    part.map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Name of the operating-system user from `USER` (Unix) or `USERNAME`
/// (Windows).
///
/// Service accounts and bare containers often set neither; `user` then
/// renders as an empty string. Set it under `[variables]` to override.
pub fn current_user() -> String {
    user_from(|key| std::env::var(key).ok())
}

fn user_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    ["USER", "USERNAME"]
        .into_iter()
        .filter_map(lookup)
        .find(|name| !name.is_empty())
        .unwrap_or_default()
}

/// Layered render context.
///
/// Immutable after creation; [`RenderContext::with_answers`] returns the
/// completed context used for the final pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    values: Map<String, Value>,
}

impl RenderContext {
    /// Static context: built-ins overridden by custom variables.
    pub fn new(builtins: BuiltinValues, variables: &BTreeMap<String, String>) -> Self {
        let mut values = builtins.into_map();
        for (key, value) in variables {
            values.insert(key.clone(), Value::String(value.clone()));
        }
        Self { values }
    }

    /// Context built from an arbitrary mapping, bypassing built-ins.
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Add the interactive-answer layer on top.
    pub fn with_answers(&self, answers: &Answers) -> Self {
        let mut values = self.values.clone();
        for (key, value) in answers.values() {
            values.insert(key.clone(), value.clone());
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}
