//! Errors raised while building or rendering a tag.
//!
//! Construction fails with either a configuration error (the host never set a
//! credential) or a usage error (the template author passed bad arguments).
//! Rendering only fails when a context reference cannot be resolved.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("'{tag}' tag requires '{key}' to be defined in the [shrink_the_web] settings")]
    Configuration { tag: String, key: String },
    #[error("{message}")]
    Usage { tag: String, message: String },
    #[error("variable '{name}' is not defined in the render context")]
    UndefinedVariable { name: String },
    #[error("variable '{name}' does not resolve to a string, number or boolean")]
    NotScalar { name: String },
}

impl TagError {
    pub(crate) fn usage(tag: &str, message: impl Into<String>) -> Self {
        TagError::Usage {
            tag: tag.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn missing_setting(tag: &str, key: &str) -> Self {
        TagError::Configuration {
            tag: tag.to_string(),
            key: key.to_string(),
        }
    }

    /// Whether this error points at host setup rather than template usage.
    pub fn is_configuration(&self) -> bool {
        matches!(self, TagError::Configuration { .. })
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, TagError::Usage { .. })
    }
}
