//! # stw-tags
//!
//! Template tags that turn a page URL and a handful of options into a
//! [ShrinkTheWeb](https://shrinktheweb.com) thumbnail: either an `<img>`
//! element pointing at the thumbnail service, or a call into the vendor's
//! preview script.
//!
//! # Architecture: Build Once, Render Many
//!
//! ```text
//! 1. Compile   tag tokens + Settings  →  Node      (merge + validate options)
//! 2. Render    Node + Context         →  String    (resolve refs, format output)
//! ```
//!
//! Everything that can be checked without a render context is checked at
//! compile time, so a template with a bad tag fails when it is loaded rather
//! than halfway through a page. Rendering can only fail on an undefined
//! context variable.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`options`] | Ordered `stw*` option sets and their layered merge |
//! | [`validate`] | Per-variant rules producing typed option records |
//! | [`render`] | Query encoding and the byte-exact output formats |
//! | [`node`] | The [`Node`](node::Node) trait and the three tag nodes |
//! | [`tags`] | Token splitting, tag functions, and the tag [`Library`](tags::Library) |
//! | [`context`] | Literal-or-reference expressions and the render context |
//! | [`config`] | `settings.toml` loading and validation |
//! | [`error`] | Configuration and usage errors |
//!
//! # Design Decisions
//!
//! ## Explicit Settings
//!
//! Default options are a [`config::Settings`] value handed to each tag
//! function. Nothing reads process-wide state, so two libraries with
//! different credentials can live in one process.
//!
//! ## Ordered Options
//!
//! Options live in an insertion-ordered list of pairs. The thumbnail URL a
//! tag produces is identical across runs and machines, which keeps rendered
//! pages cacheable and diffs clean.
//!
//! ## Two Error Kinds
//!
//! A missing access key is a host setup problem and is reported as a
//! configuration error; every other failure is the template author's and is a
//! usage error. Both abort the tag; neither produces partial output.

pub mod config;
pub mod context;
pub mod error;
pub mod node;
pub mod options;
pub mod render;
pub mod tags;
pub mod validate;

pub use config::Settings;
pub use context::{Context, Expr};
pub use error::TagError;
pub use node::Node;
pub use tags::Library;

#[cfg(test)]
pub(crate) mod test_helpers;
