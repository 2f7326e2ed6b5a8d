//! Browser-automation capability consumed by the form loop.
//!
//! The loop never touches chromiumoxide directly; it only talks to a
//! [`FormDriver`] and the [`FormElement`] handles it returns. Every call may
//! fail with [`Error::ElementNotFound`](crate::Error::ElementNotFound) or
//! [`Error::StaleElement`](crate::Error::StaleElement); callers decide how far
//! such a failure travels.
//!
//! Selectors are plain CSS. The helpers at the bottom of this module build
//! every selector the crate issues, so alternative drivers only need to
//! understand tag names, comma lists and `[attr="value"]` filters.

use async_trait::async_trait;

use crate::error::Result;

/// Page-level operations of one browser session.
#[async_trait]
pub trait FormDriver: Send + Sync {
    type Element: FormElement;

    /// Navigate the session to `url` and wait for the load event.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// First element matching `selector`, or `ElementNotFound`.
    async fn find_one(&self, selector: &str) -> Result<Self::Element>;

    /// All elements matching `selector`, in document order.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>>;
}

/// Operations on one element handle.
#[async_trait]
pub trait FormElement: Send + Sync + Sized {
    async fn get_attribute(&self, name: &str) -> Result<Option<String>>;

    /// Lowercase tag name (`input`, `select`, ...).
    async fn tag_name(&self) -> Result<String>;

    /// Rendered text content.
    async fn text(&self) -> Result<String>;

    /// All descendants matching `selector`, in document order.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self>>;

    async fn clear(&self) -> Result<()>;

    async fn send_keys(&self, text: &str) -> Result<()>;

    async fn click(&self) -> Result<()>;

    /// Checked state for checkboxes and radios, selected state for options.
    async fn is_selected(&self) -> Result<bool>;

    /// Attach `path` to a file input without validating it.
    async fn set_file(&self, path: &str) -> Result<()>;

    /// Visible labels of a `<select>`'s options, in order.
    async fn options(&self) -> Result<Vec<String>>;

    async fn select_by_visible_text(&self, label: &str) -> Result<()>;

    async fn deselect_all(&self) -> Result<()>;
}

/// Elements that can carry a form field.
pub const FIELD_SELECTOR: &str = "input, select, textarea";

/// Quote a string for use inside a CSS `[attr="..."]` filter.
pub fn css_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn by_id(id: &str) -> String {
    format!("[id={}]", css_quote(id))
}

pub fn label_for(id: &str) -> String {
    format!("label[for={}]", css_quote(id))
}

pub fn radio_with_value(value: &str) -> String {
    format!("input[type=\"radio\"][value={}]", css_quote(value))
}

pub fn radio_group(name: &str) -> String {
    format!("input[type=\"radio\"][name={}]", css_quote(name))
}

/// Submit controls in fallback order.
pub const SUBMIT_SELECTORS: [&str; 2] = ["button[type=\"submit\"]", "input[type=\"submit\"]"];
