//! Render contexts and argument expressions.
//!
//! A tag argument is either a quoted literal (`"http://example.com"`,
//! `'alt text'`) or a reference into the render context (`author.url`).
//! [`Expr::parse`] decides which once, when the tag is built; [`Expr::resolve`]
//! evaluates it on every render.
//!
//! ## Lookup Rules
//!
//! Dotted names descend through the context one segment at a time:
//!
//! - object segment → key lookup (`author.url`)
//! - numeric segment on an array → index lookup (`links.0`)
//!
//! The final value must be a string, number or boolean. Anything else, or a
//! missing segment, fails the render.

use crate::error::TagError;
use serde_json::{Map, Value};

/// A tag argument: literal text or a context reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(String),
    Var(String),
}

impl Expr {
    /// Classify a raw token.
    ///
    /// A token whose first and last characters are the same quote character
    /// is a literal with the quotes stripped; everything else is a reference.
    pub fn parse(token: &str) -> Self {
        match strip_quotes(token) {
            Some(inner) => Expr::Literal(inner.to_string()),
            None => Expr::Var(token.to_string()),
        }
    }

    pub fn resolve(&self, context: &Context) -> Result<String, TagError> {
        match self {
            Expr::Literal(text) => Ok(text.clone()),
            Expr::Var(name) => context.lookup(name),
        }
    }
}

/// Strip one pair of matching `"` or `'` quotes, if present.
pub(crate) fn strip_quotes(token: &str) -> Option<&str> {
    let first = token.chars().next()?;
    if (first == '"' || first == '\'') && token.len() >= 2 && token.ends_with(first) {
        Some(&token[1..token.len() - 1])
    } else {
        None
    }
}

fn insert_path(table: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            table.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = table
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert_path(child, rest, value);
            }
        }
    }
}

/// Variables visible to a render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    root: Map<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value. Non-object values yield an empty context.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(root) => Self { root },
            _ => Self::default(),
        }
    }

    /// Set a variable. Dotted names create nested objects as needed.
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        let segments: Vec<&str> = name.split('.').collect();
        insert_path(&mut self.root, &segments, value.into());
    }

    /// Resolve a dotted variable name to its display string.
    pub fn lookup(&self, name: &str) -> Result<String, TagError> {
        let undefined = || TagError::UndefinedVariable {
            name: name.to_string(),
        };
        let mut segments = name.split('.');
        let head = segments.next().ok_or_else(undefined)?;
        let mut current = self.root.get(head).ok_or_else(undefined)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            }
            .ok_or_else(undefined)?;
        }
        match current {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => Err(TagError::NotScalar {
                name: name.to_string(),
            }),
        }
    }
}
