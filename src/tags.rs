//! Tag functions and the tag library.
//!
//! The host template engine hands each tag invocation over as a flat list of
//! tokens, tag name first. Tag functions turn those tokens into nodes:
//!
//! ```text
//! {% stwimage author.url author.description stwinside=1 stwsize=lrg %}
//!        │         │              │                └─ keyword options
//!        │         │              └─ alt expression
//!        │         └─ url expression
//!        └─ tag name
//!
//! {% shrinkthewebimage author.url "xlg" stwinside=1 %}
//!                          │        └─ size (quotes stripped)
//!                          └─ url expression
//!
//! {% stwjavascript %}
//! ```
//!
//! Keyword values are taken verbatim as strings. Every keyword key must start
//! with `stw` and carry a non-empty value.

use crate::config::Settings;
use crate::context::{Expr, strip_quotes};
use crate::error::TagError;
use crate::node::{ImageNode, JavascriptNode, Node, PreviewNode};
use crate::options::{OptionSet, OptionValue, SIZE};
use crate::validate::check_keyword;
use std::collections::BTreeMap;

pub const STWIMAGE: &str = "stwimage";
pub const SHRINKTHEWEBIMAGE: &str = "shrinkthewebimage";
pub const STWJAVASCRIPT: &str = "stwjavascript";

/// Builds a node from the tokens of one tag invocation.
pub type TagFn = fn(&[String], &Settings) -> Result<Box<dyn Node>, TagError>;

/// Split a tag body on whitespace, keeping quoted runs together.
///
/// `stwimage "a b" 'c d' stwdelay=5` → `["stwimage", "\"a b\"", "'c d'", "stwdelay=5"]`.
/// A backslash inside quotes escapes the next character.
pub fn split_contents(body: &str) -> Vec<String> {
    let mut bits = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
            }
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    bits.push(std::mem::take(&mut current));
                }
            }
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
                current.push(c);
            }
        }
    }
    if !current.is_empty() {
        bits.push(current);
    }
    bits
}

/// Parse `key=value` tokens into an ordered keyword set, checking each.
fn parse_keywords(tag: &str, tokens: &[String]) -> Result<OptionSet, TagError> {
    let mut keywords = OptionSet::new();
    for token in tokens {
        let (key, value) = token.split_once('=').ok_or_else(|| {
            TagError::usage(
                tag,
                format!("'{tag}' tag keyword: {token} is not of the form key=value"),
            )
        })?;
        let (key, value) = (key.trim(), OptionValue::from(value.trim()));
        check_keyword(tag, key, &value)?;
        keywords.insert(key, value);
    }
    Ok(keywords)
}

fn tag_name(bits: &[String], fallback: &'static str) -> String {
    bits.first().cloned().unwrap_or_else(|| fallback.to_string())
}

/// `stwimage url alt [key=value ...]`
///
/// Supports every option of a PRO account.
pub fn do_stwimage(bits: &[String], settings: &Settings) -> Result<ImageNode, TagError> {
    let tag = tag_name(bits, STWIMAGE);
    if bits.len() < 3 {
        return Err(TagError::usage(
            &tag,
            format!("'{tag}' tag takes at least 2 arguments"),
        ));
    }
    let keywords = parse_keywords(&tag, &bits[3..])?;
    ImageNode::new(
        &tag,
        Expr::parse(&bits[1]),
        Some(Expr::parse(&bits[2])),
        &keywords,
        settings,
    )
}

/// `shrinkthewebimage url size [key=value ...]`
///
/// The legacy preview tag, rendered through the vendor's script.
pub fn do_shrinkthewebimage(
    bits: &[String],
    settings: &Settings,
) -> Result<PreviewNode, TagError> {
    let tag = tag_name(bits, SHRINKTHEWEBIMAGE);
    if bits.len() < 3 {
        return Err(TagError::usage(
            &tag,
            format!("'{tag}' tag takes 3 or more arguments"),
        ));
    }
    let size = strip_quotes(&bits[2]).unwrap_or(&bits[2]);
    let mut keywords = OptionSet::new();
    keywords.insert(SIZE, size);
    keywords.extend_from(&parse_keywords(&tag, &bits[3..])?);
    PreviewNode::new(&tag, Expr::parse(&bits[1]), &keywords, settings)
}

/// `stwjavascript`
pub fn do_stwjavascript(bits: &[String], settings: &Settings) -> Result<JavascriptNode, TagError> {
    if bits.len() > 1 {
        let tag = tag_name(bits, STWJAVASCRIPT);
        return Err(TagError::usage(
            &tag,
            format!("'{tag}' tag takes no arguments"),
        ));
    }
    Ok(JavascriptNode::new(settings))
}

/// Registry of tag functions by name.
#[derive(Debug, Clone)]
pub struct Library {
    tags: BTreeMap<String, TagFn>,
}

impl Default for Library {
    fn default() -> Self {
        let mut library = Self::empty();
        library.register(STWIMAGE, |bits, settings| {
            Ok(Box::new(do_stwimage(bits, settings)?))
        });
        library.register(SHRINKTHEWEBIMAGE, |bits, settings| {
            Ok(Box::new(do_shrinkthewebimage(bits, settings)?))
        });
        library.register(STWJAVASCRIPT, |bits, settings| {
            Ok(Box::new(do_stwjavascript(bits, settings)?))
        });
        library
    }
}

impl Library {
    pub fn empty() -> Self {
        Self {
            tags: BTreeMap::new(),
        }
    }

    /// Register `tag` under `name`, replacing any previous registration.
    pub fn register(&mut self, name: &str, tag: TagFn) {
        self.tags.insert(name.to_string(), tag);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Build the node for one tag body, e.g. `stwimage 'url' 'alt' stwsize=lrg`.
    pub fn compile(&self, body: &str, settings: &Settings) -> Result<Box<dyn Node>, TagError> {
        let bits = split_contents(body);
        let name = bits.first().map(String::as_str).unwrap_or_default();
        let tag = self.tags.get(name).ok_or_else(|| {
            TagError::usage(name, format!("Invalid block tag: '{name}'"))
        })?;
        tag(&bits, settings)
    }
}
