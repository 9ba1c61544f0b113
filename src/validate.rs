//! Per-variant option rules.
//!
//! Each tag variant turns its merged [`OptionSet`] into a typed record, or
//! fails with the first rule it breaks. The rules run once, at construction.
//!
//! | Variant | Required | Exclusive |
//! |---|---|---|
//! | preview (`shrinkthewebimage`) | `stwaccesskeyid`, `stwsize` | — |
//! | image (`stwimage`) | `stwaccesskeyid`, one sizing choice | `stwsize` ⟂ `stwfull` ⟂ (`stwxmax`/`stwymax`) |
//!
//! A missing credential is a configuration error. Everything else is a usage
//! error.

use crate::error::TagError;
use crate::options::{
    ACCESS_KEY, FULL, KEY_PREFIX, LANG, OptionSet, OptionValue, SIZE, X_MAX, Y_MAX,
};

/// Default language passed to the preview script.
pub const DEFAULT_LANG: &str = "en";

/// Validated options for the legacy preview tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewOptions {
    pub access_key: OptionValue,
    pub size: OptionValue,
    pub lang: Option<OptionValue>,
    /// The full merged set, credential and size included.
    pub options: OptionSet,
}

impl PreviewOptions {
    pub fn lang(&self) -> String {
        self.lang
            .as_ref()
            .map_or_else(|| DEFAULT_LANG.to_string(), ToString::to_string)
    }
}

/// How the image tag asks the service to size its thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sizing {
    /// A named size such as `lrg` or `xlg`.
    Size(OptionValue),
    /// Full-length capture.
    Full(OptionValue),
    /// Custom bounds; at least one side is set.
    Bounds {
        x_max: Option<OptionValue>,
        y_max: Option<OptionValue>,
    },
}

/// Validated options for the full-featured image tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    pub access_key: OptionValue,
    pub sizing: Sizing,
    pub options: OptionSet,
}

fn required_credential(tag: &str, options: &OptionSet) -> Result<OptionValue, TagError> {
    match options.get(ACCESS_KEY) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(TagError::missing_setting(tag, ACCESS_KEY)),
    }
}

/// Reject an unprefixed key or an empty value passed as a tag keyword.
pub fn check_keyword(tag: &str, key: &str, value: &OptionValue) -> Result<(), TagError> {
    if value.is_empty() {
        return Err(TagError::usage(
            tag,
            format!("'{tag}' tag keyword: {key} has no argument"),
        ));
    }
    if !key.starts_with(KEY_PREFIX) {
        return Err(TagError::usage(
            tag,
            format!("'{tag}' tag keyword: {key} is not a valid STW keyword"),
        ));
    }
    Ok(())
}

/// [`check_keyword`] over every entry of a keyword set.
pub fn check_keywords(tag: &str, keywords: &OptionSet) -> Result<(), TagError> {
    keywords
        .iter()
        .try_for_each(|(key, value)| check_keyword(tag, key, value))
}

pub fn validate_preview(tag: &str, options: OptionSet) -> Result<PreviewOptions, TagError> {
    let access_key = required_credential(tag, &options)?;
    let size = match options.get(SIZE) {
        Some(size) if !size.is_empty() => size.clone(),
        _ => {
            return Err(TagError::usage(
                tag,
                format!("'{tag}' tag requires '{SIZE}' keyword"),
            ));
        }
    };
    Ok(PreviewOptions {
        access_key,
        size,
        lang: options.get(LANG).cloned(),
        options,
    })
}

pub fn validate_image(tag: &str, options: OptionSet) -> Result<ImageOptions, TagError> {
    let access_key = required_credential(tag, &options)?;

    let size = options.get(SIZE).cloned();
    let full = options.get(FULL).cloned();
    let x_max = options.get(X_MAX).cloned();
    let y_max = options.get(Y_MAX).cloned();

    let conflict = |first: &str, second: &str| {
        TagError::usage(
            tag,
            format!("'{tag}' tag does not allow '{first}' together with '{second}'"),
        )
    };

    let sizing = match (size, full) {
        (Some(_), Some(_)) => return Err(conflict(SIZE, FULL)),
        (Some(size), None) => {
            if x_max.is_some() {
                return Err(conflict(SIZE, X_MAX));
            }
            if y_max.is_some() {
                return Err(conflict(SIZE, Y_MAX));
            }
            Sizing::Size(size)
        }
        (None, Some(full)) => {
            if x_max.is_some() {
                return Err(conflict(FULL, X_MAX));
            }
            if y_max.is_some() {
                return Err(conflict(FULL, Y_MAX));
            }
            Sizing::Full(full)
        }
        (None, None) if x_max.is_some() || y_max.is_some() => Sizing::Bounds { x_max, y_max },
        (None, None) => {
            return Err(TagError::usage(
                tag,
                format!(
                    "'{tag}' tag requires '{SIZE}' or ('{FULL}' or ('{X_MAX}' and/or '{Y_MAX}')) keyword(s)"
                ),
            ));
        }
    };

    Ok(ImageOptions {
        access_key,
        sizing,
        options,
    })
}
