//! HTML embed rendering
//!
//! Pure helpers that turn a media identifier plus optional attribute/style
//! mappings into a ready-to-insert HTML fragment (an `<iframe>` or another
//! single-element tag). No I/O and no mutable state; untrusted values are
//! HTML-escaped before they reach the fragment.
//!
//! Mappings are modeled as `serde_json::Value` objects so templating layers
//! can hand over whatever they deserialized. A value that is not an object
//! counts as "not a mapping" and degrades to empty output; this layer never
//! errors.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Escape the characters that can break out of markup or a quoted attribute.
/// Exactly `&`, `<`, `>`, `"`, and `'`; slashes stay intact so URLs render
/// as written.
fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Resolve the source URL for a media identifier.
///
/// Identifiers that are already absolute or scheme-relative URLs are returned
/// unchanged; anything else is joined onto the configured media URL root.
pub fn resolve_embed_url(media_id: &str, url_root: &str) -> String {
    if media_id.starts_with("http://")
        || media_id.starts_with("https://")
        || media_id.starts_with("//")
    {
        return media_id.to_string();
    }
    url_join(url_root, media_id)
}

/// Join a path segment onto a root with exactly one separating slash.
pub fn url_join(root: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        root.trim_end_matches('/'),
        segment.trim_start_matches('/')
    )
}

/// Generate an attribute string from a mapping of key/value pairs.
///
/// Non-mapping input yields an empty string. Each pair renders as
/// `key="value" ` (trailing space included) in insertion order, with the
/// value coerced to a string and HTML-escaped.
pub fn attribute_string(attrs: Option<&Value>) -> String {
    let Some(Value::Object(map)) = attrs else {
        return String::new();
    };

    let mut out = String::new();
    for (key, value) in map {
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_html(coerce_to_str(value).as_ref()));
        out.push_str("\" ");
    }
    out
}

/// Generate a style attribute string from a mapping of property/value pairs.
///
/// Returns `None` for non-mapping input and `Some("")` for an empty mapping,
/// so callers can tell the two apart. A non-empty mapping renders as
/// `style="prop:value;..." ` with a trailing space after the closing quote.
pub fn style_string(style: Option<&Value>) -> Option<String> {
    let Some(Value::Object(map)) = style else {
        return None;
    };
    if map.is_empty() {
        return Some(String::new());
    }

    let mut out = String::from("style=\"");
    for (prop, value) in map {
        out.push_str(prop);
        out.push(':');
        out.push_str(&escape_html(coerce_to_str(value).as_ref()));
        out.push(';');
    }
    out.push_str("\" ");
    Some(out)
}

/// Render a single-element embed such as `<iframe src="..."></iframe>`.
///
/// Missing attribute/style mappings are treated as empty mappings, so their
/// string forms are `""`.
pub fn render_single_element_embed(
    tag_name: &str,
    src_url: &str,
    attrs: Option<&Value>,
    style: Option<&Value>,
) -> String {
    format!(
        "<{tag} src=\"{src}\" {attrs}{style}></{tag}>",
        tag = tag_name,
        src = escape_html(src_url),
        attrs = attribute_string(attrs),
        style = style_string(style).unwrap_or_default(),
    )
}

/// Render an iframe embed.
pub fn render_iframe_embed(src_url: &str, attrs: Option<&Value>, style: Option<&Value>) -> String {
    render_single_element_embed("iframe", src_url, attrs, style)
}

/// Renderer input for one embed: a media identifier plus optional attribute
/// and style mappings. Purely a value; rendering produces a fresh string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedSpec {
    pub media_id: String,
    #[serde(default)]
    pub attrs: Option<Value>,
    #[serde(default)]
    pub style: Option<Value>,
}

impl EmbedSpec {
    pub fn new(media_id: impl Into<String>) -> Self {
        EmbedSpec {
            media_id: media_id.into(),
            attrs: None,
            style: None,
        }
    }

    /// Render this spec as a single-element embed under the given URL root.
    pub fn render(&self, tag_name: &str, url_root: &str) -> String {
        let src_url = resolve_embed_url(&self.media_id, url_root);
        render_single_element_embed(tag_name, &src_url, self.attrs.as_ref(), self.style.as_ref())
    }

    /// Render this spec as an iframe embed under the given URL root.
    pub fn render_iframe(&self, url_root: &str) -> String {
        self.render("iframe", url_root)
    }
}

/// Coerce a JSON value to the string form used in attributes. Strings render
/// bare (no surrounding quotes); everything else uses its JSON text.
fn coerce_to_str(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}
