//! Nodes of the hierarchical template view.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::entities::template::Template;

/// A node in the workspace → template tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Workspace {
        name: String,
        /// `true` until the workspace's first scan completes.
        loading: bool,
    },
    Template {
        workspace: String,
        template: Template,
    },
}

/// How a node should be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeItem {
    pub label: String,
    pub description: Option<String>,
    pub collapsible: bool,
    pub path: Option<PathBuf>,
}

impl TreeNode {
    pub fn item(&self) -> TreeItem {
        match self {
            Self::Workspace { name, loading } => TreeItem {
                label: name.clone(),
                description: loading.then(|| "loading…".to_string()),
                collapsible: true,
                path: None,
            },
            Self::Template { template, .. } => TreeItem {
                label: template.label.clone(),
                description: Some(template.name.clone()),
                collapsible: false,
                path: Some(template.path.clone()),
            },
        }
    }
}
