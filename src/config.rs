//! Settings loading.
//!
//! Default tag options come from a `settings.toml` file rather than from a
//! process-wide global. The loaded [`Settings`] value is passed to every tag
//! constructor explicitly.
//!
//! ## Settings File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! secure = false            # Use https for every ShrinkTheWeb URL
//!
//! [shrink_the_web]          # Default options applied to every tag
//! stwaccesskeyid = "..."    # Access key (required by every tag)
//! stwembed = 0              # Any other stw* option, string or integer
//! ```
//!
//! ## Loading
//!
//! A missing file means [`Settings::default`]: plain http and no default
//! options. Otherwise the file is deserialized (absent fields take their
//! defaults) and validated. The `[shrink_the_web]` table keeps its document
//! order, which becomes the order of the rendered query string. Tag keywords
//! are layered over these defaults later, at node construction.

use crate::options::{ACCESS_KEY, KEY_PREFIX, OptionSet};
use crate::render::Scheme;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Settings validation error: {0}")]
    Validation(String),
}

/// Host settings consumed by every tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Use https instead of http for every vendor URL.
    pub secure: bool,
    /// Default options, lowest precedence layer of every tag.
    pub shrink_the_web: OptionSet,
}

impl Settings {
    /// Settings carrying only a credential.
    pub fn with_access_key(key: &str) -> Self {
        let mut settings = Self::default();
        settings.shrink_the_web.insert(ACCESS_KEY, key);
        settings
    }

    pub fn scheme(&self) -> Scheme {
        if self.secure {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }

    /// Every default option must be one the remote service could accept.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(key) = self
            .shrink_the_web
            .keys()
            .find(|key| !key.starts_with(KEY_PREFIX))
        {
            return Err(ConfigError::Validation(format!(
                "shrink_the_web.{key} must start with '{KEY_PREFIX}'"
            )));
        }
        if let Some((key, _)) = self.shrink_the_web.iter().find(|(_, v)| v.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "shrink_the_web.{key} must not be empty"
            )));
        }
        Ok(())
    }
}

/// Parse and validate the contents of a settings file.
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = toml::from_str(content)?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from `path`, falling back to [`Settings::default`] when absent.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(Settings::default());
    }
    let settings = parse_settings(&fs::read_to_string(path)?)?;
    tracing::debug!(
        path = %path.display(),
        options = settings.shrink_the_web.len(),
        secure = settings.secure,
        "loaded settings"
    );
    Ok(settings)
}

/// Returns a fully-commented stock `settings.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_settings_toml() -> &'static str {
    r##"# ShrinkTheWeb tag settings
# =========================
# All settings are optional. Values shown below are the defaults.

# Emit https:// instead of http:// for the thumbnail service and the
# preview script.
secure = false

# Default options applied to every tag, lowest precedence. Tag keywords
# override them. Keys must start with "stw"; values are strings or integers.
# Options are sent to the service in the order written here.
[shrink_the_web]
# stwaccesskeyid = "your-access-key"   # Required by every tag
# stwembed = 1
# stwinside = 1
"##
}
