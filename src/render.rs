//! Output formatting for both tag variants.
//!
//! ## Output Formats
//!
//! ```text
//! script:  <script type="text/javascript">stw_pagepix('URL','KEY','SIZE','LANG'[,'OPTS']);</script>
//! markup:  <img src="http://images.shrinktheweb.com/xino.php?K1=V1&...&stwurl=URL" alt="ALT"/>
//! include: <script type="text/javascript" src="http://www.shrinktheweb.com/scripts/pagepix.js"></script>
//! ```
//!
//! These strings are consumed by existing pages and by the vendor's script,
//! so they are produced byte for byte, in option insertion order.
//!
//! ## Encoding
//!
//! Option keys and values are form-encoded: RFC 3986 unreserved characters
//! pass through, a space becomes `+`, everything else is percent-encoded.
//! The page URL is appended as given. The alt text is HTML-escaped with maud.

use crate::options::{ACCESS_KEY, LANG, OptionValue, SIZE, URL};
use crate::validate::{ImageOptions, PreviewOptions};
use maud::html;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};
use serde::{Deserialize, Serialize};

/// Unreserved characters: A-Z a-z 0-9 - . _ ~
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// JavaScript function the vendor script defines.
const PAGEPIX_FN: &str = "stw_pagepix";

/// URL scheme for every vendor URL the crate emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// Base of the thumbnail request URL.
    pub fn image_base(self) -> String {
        format!("{}://images.shrinktheweb.com/xino.php", self.as_str())
    }

    /// Location of the vendor's preview script.
    pub fn script_src(self) -> String {
        format!("{}://www.shrinktheweb.com/scripts/pagepix.js", self.as_str())
    }
}

fn encode_component(input: &str) -> String {
    percent_encode(input.as_bytes(), QUERY_ENCODE_SET)
        .to_string()
        .replace("%20", "+")
}

/// Form-encode options in the order given.
pub fn urlencode<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a OptionValue)>) -> String {
    pairs
        .into_iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                encode_component(key),
                encode_component(&value.to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Script mode: a `stw_pagepix(...)` call with four or five quoted arguments.
///
/// The fifth argument carries every option except credential, size and
/// language, and is left out when there are none.
pub fn render_script(url: &str, preview: &PreviewOptions) -> String {
    let mut args = vec![
        url.to_string(),
        preview.access_key.to_string(),
        preview.size.to_string(),
        preview.lang(),
    ];
    let remaining = urlencode(preview.options.without(&[ACCESS_KEY, SIZE, LANG]));
    if !remaining.is_empty() {
        args.push(remaining);
    }
    let quoted: Vec<String> = args.iter().map(|arg| format!("'{arg}'")).collect();
    format!(
        "<script type=\"text/javascript\">{PAGEPIX_FN}({});</script>",
        quoted.join(",")
    )
}

/// Markup mode: a self-closing `<img>` whose query carries every option
/// followed by `stwurl`.
pub fn render_img(scheme: Scheme, url: &str, alt: &str, image: &ImageOptions) -> String {
    let mut query = urlencode(image.options.iter());
    if !query.is_empty() {
        query.push('&');
    }
    let alt = html! { (alt) }.into_string();
    format!(
        "<img src=\"{}?{query}{URL}={url}\" alt=\"{alt}\"/>",
        scheme.image_base()
    )
}

/// Script include for the vendor's preview JavaScript, over plain http.
pub fn stwjavascript() -> String {
    stwjavascript_for(Scheme::Http)
}

/// [`stwjavascript`] for a given scheme; `secure = true` selects https.
pub fn stwjavascript_for(scheme: Scheme) -> String {
    format!(
        "<script type=\"text/javascript\" src=\"{}\"></script>",
        scheme.script_src()
    )
}
