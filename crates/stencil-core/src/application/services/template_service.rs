//! Template Service - template file management.
//!
//! Handles read/save/create/rename/delete of template files.
//! Separated from the catalog, which only observes the results through
//! watcher events or a refresh.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::{DEFAULT_TEMPLATE_EXTENSION, DomainValidator as validator, Template, template_file_name},
    error::StencilResult,
};

/// Service for template file operations.
pub struct TemplateService {
    filesystem: Arc<dyn Filesystem>,
    extension: String,
}

impl TemplateService {
    /// Create a new template service using the default `hbs` extension.
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self {
            filesystem,
            extension: DEFAULT_TEMPLATE_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Read a template file.
    pub fn read_template(&self, path: &Path) -> StencilResult<Template> {
        let code = self.filesystem.read_text(path)?;
        Ok(Template::from_file(path, code, &self.extension)?)
    }

    /// Write `template.code` back to `template.path`.
    pub fn save_template(&self, template: &Template) -> StencilResult<()> {
        self.filesystem.write_text(&template.path, &template.code)
    }

    /// Create `<dir>/<name>.<ext>` with `code`.
    #[instrument(skip(self, code), fields(dir = %dir.display()))]
    pub fn create_template(&self, dir: &Path, name: &str, code: &str) -> StencilResult<Template> {
        validator::validate_template_name(name)?;

        let path = dir.join(template_file_name(name, &self.extension));
        if self.filesystem.exists(&path) {
            return Err(ApplicationError::TemplateExists { path }.into());
        }

        if !self.filesystem.exists(dir) {
            self.filesystem.create_dir_all(dir)?;
        }
        self.filesystem.write_text(&path, code)?;
        debug!(path = %path.display(), "Template created");

        Ok(Template::from_file(path, code, &self.extension)?)
    }

    /// Rename a template within its directory.
    #[instrument(skip(self, template), fields(from = %template.name))]
    pub fn rename_template(&self, template: &Template, new_name: &str) -> StencilResult<Template> {
        validator::validate_template_name(new_name)?;

        let to = template
            .directory()
            .join(template_file_name(new_name, &self.extension));
        if to == template.path {
            return Ok(template.clone());
        }
        if self.filesystem.exists(&to) {
            return Err(ApplicationError::TemplateExists { path: to }.into());
        }

        self.filesystem.rename(&template.path, &to)?;
        debug!(to = %to.display(), "Template renamed");

        Ok(Template::from_file(to, template.code.clone(), &self.extension)?)
    }

    /// Delete a template file.
    pub fn delete_template(&self, template: &Template) -> StencilResult<()> {
        if !self.filesystem.exists(&template.path) {
            return Err(ApplicationError::TemplateNotFound {
                name: template.name.clone(),
            }
            .into());
        }
        self.filesystem.delete(&template.path)?;
        debug!(path = %template.path.display(), "Template deleted");
        Ok(())
    }
}
