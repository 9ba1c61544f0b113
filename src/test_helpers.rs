//! Shared test utilities for building settings, keywords and contexts.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let node = ImageNode::new(
//!     "stwimage",
//!     Expr::parse("url"),
//!     None,
//!     &keywords(&[("stwsize", "lrg")]),
//!     &key_settings(),
//! )
//! .unwrap();
//! let html = node.render(&context(&[("url", "http://example.com")])).unwrap();
//! ```

use crate::config::Settings;
use crate::context::Context;
use crate::options::OptionSet;

/// Settings whose only default is `stwaccesskeyid = "key"`.
pub fn key_settings() -> Settings {
    Settings::with_access_key("key")
}

/// String-valued keyword options, in the order given.
pub fn keywords(pairs: &[(&str, &str)]) -> OptionSet {
    pairs.iter().copied().collect()
}

/// A context built from dotted names and string values.
pub fn context(vars: &[(&str, &str)]) -> Context {
    let mut ctx = Context::new();
    for (name, value) in vars {
        ctx.insert(name, *value);
    }
    ctx
}

/// Split a tag body the way the template engine would.
pub fn bits(body: &str) -> Vec<String> {
    crate::tags::split_contents(body)
}
