//! Template nodes.
//!
//! A node is built once from a tag's arguments and rendered any number of
//! times against different contexts. Construction merges and validates the
//! options, so a node that exists is always renderable except for context
//! lookups.
//!
//! ```text
//! settings defaults ─┐
//! instance defaults ─┼─► OptionSet ─► validate ─► node ─► render(ctx) ─► String
//! tag keywords ──────┘
//! ```

use crate::config::Settings;
use crate::context::{Context, Expr};
use crate::error::TagError;
use crate::options::{EMBED, OptionSet, OptionValue};
use crate::render::{self, Scheme};
use crate::validate::{
    ImageOptions, PreviewOptions, check_keywords, validate_image, validate_preview,
};

/// Something the host template engine can render.
pub trait Node: Send + Sync + std::fmt::Debug {
    fn render(&self, context: &Context) -> Result<String, TagError>;
}

/// Legacy preview tag (`shrinkthewebimage`), rendered as a script call.
#[derive(Debug, Clone)]
pub struct PreviewNode {
    tag: String,
    url: Expr,
    options: PreviewOptions,
}

impl PreviewNode {
    pub fn new(
        tag: &str,
        url: Expr,
        keywords: &OptionSet,
        settings: &Settings,
    ) -> Result<Self, TagError> {
        check_keywords(tag, keywords)?;
        let merged = OptionSet::merged(&settings.shrink_the_web, &OptionSet::new(), keywords);
        let options = validate_preview(tag, merged)?;
        let keys: Vec<&str> = options.options.keys().collect();
        tracing::debug!(tag, ?keys, "built preview node");
        Ok(Self {
            tag: tag.to_string(),
            url,
            options,
        })
    }

    pub fn url(&self) -> &Expr {
        &self.url
    }

    pub fn options(&self) -> &PreviewOptions {
        &self.options
    }
}

impl Node for PreviewNode {
    fn render(&self, context: &Context) -> Result<String, TagError> {
        let url = self.url.resolve(context)?;
        tracing::debug!(tag = %self.tag, mode = "script", "rendering");
        Ok(render::render_script(&url, &self.options))
    }
}

/// Full-featured image tag (`stwimage`), rendered as an `<img>` element.
#[derive(Debug, Clone)]
pub struct ImageNode {
    tag: String,
    url: Expr,
    alt: Option<Expr>,
    scheme: Scheme,
    options: ImageOptions,
}

impl ImageNode {
    /// `stwembed` defaults to `1` so the service returns the image itself.
    ///
    /// Keywords must be `stw`-prefixed and non-empty, whichever way they
    /// reach the constructor.
    pub fn new(
        tag: &str,
        url: Expr,
        alt: Option<Expr>,
        keywords: &OptionSet,
        settings: &Settings,
    ) -> Result<Self, TagError> {
        check_keywords(tag, keywords)?;
        let mut instance_defaults = OptionSet::new();
        instance_defaults.insert(EMBED, OptionValue::Int(1));
        let merged = OptionSet::merged(&settings.shrink_the_web, &instance_defaults, keywords);
        let options = validate_image(tag, merged)?;
        let keys: Vec<&str> = options.options.keys().collect();
        tracing::debug!(tag, ?keys, "built image node");
        Ok(Self {
            tag: tag.to_string(),
            url,
            alt,
            scheme: settings.scheme(),
            options,
        })
    }

    pub fn url(&self) -> &Expr {
        &self.url
    }

    pub fn alt(&self) -> Option<&Expr> {
        self.alt.as_ref()
    }

    pub fn options(&self) -> &ImageOptions {
        &self.options
    }
}

impl Node for ImageNode {
    fn render(&self, context: &Context) -> Result<String, TagError> {
        let url = self.url.resolve(context)?;
        let alt = match &self.alt {
            Some(alt) => alt.resolve(context)?,
            None => String::new(),
        };
        tracing::debug!(tag = %self.tag, mode = "markup", "rendering");
        Ok(render::render_img(self.scheme, &url, &alt, &self.options))
    }
}

/// The `stwjavascript` include; takes no arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavascriptNode {
    scheme: Scheme,
}

impl JavascriptNode {
    pub fn new(settings: &Settings) -> Self {
        Self {
            scheme: settings.scheme(),
        }
    }
}

impl Node for JavascriptNode {
    fn render(&self, _context: &Context) -> Result<String, TagError> {
        Ok(render::stwjavascript_for(self.scheme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ACCESS_KEY, FULL, SIZE, X_MAX, Y_MAX};
    use crate::test_helpers::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn image_node_takes_credential_from_settings() {
        let node = ImageNode::new(
            "stwimage",
            Expr::parse("url"),
            Some(Expr::parse("alt")),
            &keywords(&[(SIZE, "lrg")]),
            &key_settings(),
        )
        .unwrap();
        assert_eq!(node.url(), &Expr::Var("url".into()));
        assert_eq!(node.alt(), Some(&Expr::Var("alt".into())));
        assert_eq!(node.options().access_key, OptionValue::from("key"));
    }

    #[test]
    fn image_node_keyword_overrides_credential() {
        let node = ImageNode::new(
            "stwimage",
            Expr::parse("url"),
            None,
            &keywords(&[(ACCESS_KEY, "overridekey"), (SIZE, "lrg")]),
            &key_settings(),
        )
        .unwrap();
        assert_eq!(node.options().access_key, OptionValue::from("overridekey"));
    }

    #[test]
    fn image_node_keeps_extra_settings() {
        let mut settings = key_settings();
        settings.shrink_the_web.insert("stwanewkey", "newkey");
        let node = ImageNode::new(
            "stwimage",
            Expr::parse("url"),
            None,
            &keywords(&[(ACCESS_KEY, "overridekey"), (SIZE, "lrg")]),
            &settings,
        )
        .unwrap();
        let options = &node.options().options;
        assert_eq!(options.get(ACCESS_KEY), Some(&OptionValue::from("overridekey")));
        assert_eq!(options.get("stwanewkey"), Some(&OptionValue::from("newkey")));
    }

    #[test]
    fn image_node_defaults_embed() {
        let node = ImageNode::new(
            "stwimage",
            Expr::parse("'url'"),
            None,
            &keywords(&[(ACCESS_KEY, "key"), (SIZE, "lrg")]),
            &Settings::default(),
        )
        .unwrap();
        let options = &node.options().options;
        assert_eq!(options.len(), 3);
        assert_eq!(options.get(EMBED), Some(&OptionValue::Int(1)));
    }

    #[test]
    fn image_node_explicit_embed_wins() {
        let mut words = keywords(&[(ACCESS_KEY, "key"), (SIZE, "lrg")]);
        words.insert(EMBED, OptionValue::Int(0));
        let node = ImageNode::new(
            "stwimage",
            Expr::parse("'url'"),
            None,
            &words,
            &Settings::default(),
        )
        .unwrap();
        let options = &node.options().options;
        assert_eq!(options.len(), 3);
        assert_eq!(options.get(EMBED), Some(&OptionValue::Int(0)));
    }

    #[test]
    fn image_node_embed_default_beats_settings() {
        let mut settings = key_settings();
        settings.shrink_the_web.insert(EMBED, OptionValue::Int(0));
        let node = ImageNode::new(
            "stwimage",
            Expr::parse("'url'"),
            None,
            &keywords(&[(SIZE, "lrg")]),
            &settings,
        )
        .unwrap();
        assert_eq!(
            node.options().options.get(EMBED),
            Some(&OptionValue::Int(1))
        );
    }

    #[test]
    fn image_node_bounds_combinations() {
        for words in [
            keywords(&[(X_MAX, "100")]),
            keywords(&[(Y_MAX, "100")]),
            keywords(&[(Y_MAX, "200"), (X_MAX, "100")]),
            keywords(&[(FULL, "1")]),
        ] {
            let node = ImageNode::new(
                "stwimage",
                Expr::parse("'url'"),
                None,
                &words,
                &key_settings(),
            );
            assert!(node.is_ok(), "{words:?} should be accepted");
        }
    }

    #[test]
    fn image_node_without_credential_is_configuration_error() {
        let err = ImageNode::new(
            "stwimage",
            Expr::parse("url"),
            Some(Expr::parse("alt")),
            &keywords(&[(SIZE, "lrg")]),
            &Settings::default(),
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn image_node_rejects_unprefixed_keyword() {
        let err = ImageNode::new(
            "stwimage",
            Expr::parse("'url'"),
            None,
            &keywords(&[(SIZE, "lrg"), ("size", "xlg")]),
            &key_settings(),
        )
        .unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("size is not a valid STW keyword"));
    }

    #[test]
    fn image_node_rejects_empty_keyword() {
        let err = ImageNode::new(
            "stwimage",
            Expr::parse("'url'"),
            None,
            &keywords(&[(SIZE, "lrg"), ("stwdelay", "")]),
            &key_settings(),
        )
        .unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("stwdelay has no argument"));
    }

    #[test]
    fn image_node_checks_keywords_not_settings() {
        let mut settings = key_settings();
        settings.shrink_the_web.insert("stwanewkey", "");
        let node = ImageNode::new(
            "stwimage",
            Expr::parse("'url'"),
            None,
            &keywords(&[(SIZE, "lrg")]),
            &settings,
        );
        assert!(node.is_ok());
    }

    #[test]
    fn image_node_renders_from_context() {
        let node = ImageNode::new(
            "stwimage",
            Expr::parse("url"),
            Some(Expr::parse("alt")),
            &keywords(&[(SIZE, "lrg")]),
            &key_settings(),
        )
        .unwrap();
        let ctx = context(&[("url", "url"), ("alt", "alt")]);
        assert_eq!(
            node.render(&ctx).unwrap(),
            "<img src=\"http://images.shrinktheweb.com/xino.php?stwaccesskeyid=key&stwembed=1&stwsize=lrg&stwurl=url\" alt=\"alt\"/>"
        );
    }

    #[test]
    fn image_node_renders_fresh_each_time() {
        let node = ImageNode::new(
            "stwimage",
            Expr::parse("page.url"),
            Some(Expr::parse("'alt'")),
            &keywords(&[(SIZE, "lrg")]),
            &key_settings(),
        )
        .unwrap();
        let first = node.render(&context(&[("page.url", "a")])).unwrap();
        let second = node.render(&context(&[("page.url", "b")])).unwrap();
        assert!(first.contains("stwurl=a\""));
        assert!(second.contains("stwurl=b\""));
    }

    #[test]
    fn image_node_undefined_variable_fails_render() {
        let node = ImageNode::new(
            "stwimage",
            Expr::parse("author.url"),
            Some(Expr::parse("'alt'")),
            &keywords(&[(SIZE, "lrg")]),
            &key_settings(),
        )
        .unwrap();
        assert_eq!(
            node.render(&Context::new()),
            Err(TagError::UndefinedVariable {
                name: "author.url".into()
            })
        );
    }

    #[test]
    fn image_node_uses_secure_scheme() {
        let mut settings = key_settings();
        settings.secure = true;
        let node = ImageNode::new(
            "stwimage",
            Expr::parse("'url'"),
            Some(Expr::parse("'alt'")),
            &keywords(&[(SIZE, "lrg")]),
            &settings,
        )
        .unwrap();
        assert!(
            node.render(&Context::new())
                .unwrap()
                .starts_with("<img src=\"https://images.shrinktheweb.com/xino.php?")
        );
    }

    #[test]
    fn preview_node_renders_script() {
        let node = PreviewNode::new(
            "shrinkthewebimage",
            Expr::parse("'url'"),
            &keywords(&[(SIZE, "sm")]),
            &key_settings(),
        )
        .unwrap();
        assert_eq!(
            node.render(&Context::new()).unwrap(),
            "<script type=\"text/javascript\">stw_pagepix('url','key','sm','en');</script>"
        );
    }

    #[test]
    fn preview_node_has_no_embed_default() {
        let node = PreviewNode::new(
            "shrinkthewebimage",
            Expr::parse("'url'"),
            &keywords(&[(SIZE, "sm")]),
            &key_settings(),
        )
        .unwrap();
        assert!(!node.options().options.contains_key(EMBED));
    }

    #[test]
    fn preview_node_requires_size() {
        let err = PreviewNode::new(
            "shrinkthewebimage",
            Expr::parse("'url'"),
            &OptionSet::new(),
            &key_settings(),
        )
        .unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn preview_node_rejects_unprefixed_keyword() {
        let err = PreviewNode::new(
            "shrinkthewebimage",
            Expr::parse("'url'"),
            &keywords(&[(SIZE, "sm"), ("lang", "de")]),
            &key_settings(),
        )
        .unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("lang is not a valid STW keyword"));
    }

    #[test]
    fn javascript_node_ignores_context() {
        let node = JavascriptNode::new(&Settings::default());
        assert_eq!(
            node.render(&Context::new()).unwrap(),
            render::stwjavascript()
        );
    }

    #[test]
    fn javascript_node_follows_secure_setting() {
        let settings = Settings {
            secure: true,
            ..Settings::default()
        };
        let html = JavascriptNode::new(&settings).render(&Context::new()).unwrap();
        assert!(html.contains("src=\"https://www.shrinktheweb.com/scripts/pagepix.js\""));
    }

    #[test]
    fn nodes_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ImageNode>();
        assert_send_sync::<PreviewNode>();
        assert_send_sync::<Box<dyn Node>>();
    }
}
