use crate::domain::{entities::directive::InteractiveDirective, error::DomainError};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across entities.
pub struct DomainValidator;

impl DomainValidator {
    /// A template name becomes a file name, so it must be a single path
    /// component.
    pub fn validate_template_name(name: &str) -> Result<(), DomainError> {
        let reason = if name.trim().is_empty() {
            Some("name cannot be empty")
        } else if name.contains('/') || name.contains('\\') {
            Some("name cannot contain path separators")
        } else if name == "." || name == ".." {
            Some("name cannot be a relative path marker")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(DomainError::InvalidTemplateName {
                name: name.into(),
                reason: reason.into(),
            }),
            None => Ok(()),
        }
    }

    /// Directive keys become render-context variables.
    pub fn validate_directive_key(key: &str) -> Result<(), DomainError> {
        if key.is_empty() {
            return Err(DomainError::InvalidDirectiveKey {
                key: key.into(),
                reason: "key cannot be empty".into(),
            });
        }
        if key.chars().any(|c| c.is_whitespace() || c == '.') {
            return Err(DomainError::InvalidDirectiveKey {
                key: key.into(),
                reason: "key cannot contain whitespace or '.'".into(),
            });
        }
        Ok(())
    }

    pub fn validate_directive(directive: &InteractiveDirective) -> Result<(), DomainError> {
        Self::validate_directive_key(&directive.key)?;
        if directive.interaction.message().trim().is_empty() {
            return Err(DomainError::MissingDirectiveMessage {
                key: directive.key.clone(),
                kind: directive.kind().to_string(),
            });
        }
        Ok(())
    }
}
