use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::element::Element as CrElement;
use chromiumoxide::page::Page as CrPage;

use crate::driver::FormElement;
use crate::error::{Error, Result};

/// Wrapper around a chromiumoxide Element, providing the form-facing API.
pub struct Element {
    inner: CrElement,
    page: CrPage,
}

impl Element {
    pub(crate) fn new(inner: CrElement, page: CrPage) -> Self {
        Self { inner, page }
    }

    /// Call `function` with `this` bound to the element and return its JSON value.
    async fn call(&self, function: impl Into<String>) -> Result<serde_json::Value> {
        let returns = self
            .inner
            .call_js_fn(function, false)
            .await
            .map_err(stale_or_cdp)?;
        if let Some(details) = returns.exception_details {
            return Err(Error::JsError(details.text));
        }
        Ok(returns.result.value.unwrap_or(serde_json::Value::Null))
    }

    /// Like [`call`](Self::call) for functions that report success as a boolean.
    async fn call_checked(&self, function: String, what: &str) -> Result<()> {
        match self.call(function).await? {
            serde_json::Value::Bool(true) => Ok(()),
            _ => Err(Error::ElementNotFound(what.to_string())),
        }
    }
}

/// chromiumoxide reports detached nodes as a protocol error; surface those as stale.
fn stale_or_cdp(e: chromiumoxide::error::CdpError) -> Error {
    let message = e.to_string();
    if message.contains("Could not find node") || message.contains("No node with given id") {
        Error::StaleElement(message)
    } else {
        Error::CdpError(e)
    }
}

fn js_string(value: &str) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

#[async_trait]
impl FormElement for Element {
    async fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        self.inner.attribute(name).await.map_err(stale_or_cdp)
    }

    async fn tag_name(&self) -> Result<String> {
        let tag = self.call("function() { return this.tagName.toLowerCase(); }").await?;
        Ok(tag.as_str().unwrap_or_default().to_string())
    }

    async fn text(&self) -> Result<String> {
        Ok(self
            .inner
            .inner_text()
            .await
            .map_err(stale_or_cdp)?
            .unwrap_or_default())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>> {
        let els = self
            .inner
            .find_elements(selector)
            .await
            .map_err(|e| Error::ElementNotFound(e.to_string()))?;
        Ok(els
            .into_iter()
            .map(|el| Element::new(el, self.page.clone()))
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        self.call(
            r#"function() {
                if (!('value' in this)) return;
                this.value = '';
                this.dispatchEvent(new Event('input', { bubbles: true }));
            }"#,
        )
        .await?;
        Ok(())
    }

    /// Widgets without a typing surface (date pickers, colour, range) get
    /// their value assigned directly; everything else is typed key by key.
    async fn send_keys(&self, text: &str) -> Result<()> {
        let text_js = js_string(text)?;
        let assigned = self
            .call(format!(
                r#"function() {{
                    const direct = ['date', 'time', 'datetime-local', 'month', 'week', 'color', 'range'];
                    if (this.tagName !== 'INPUT' || !direct.includes(this.type)) return false;
                    this.value = {text_js};
                    this.dispatchEvent(new Event('input', {{ bubbles: true }}));
                    this.dispatchEvent(new Event('change', {{ bubbles: true }}));
                    return true;
                }}"#
            ))
            .await?;
        if assigned == serde_json::Value::Bool(true) {
            return Ok(());
        }
        self.inner.focus().await.map_err(stale_or_cdp)?;
        self.inner.type_str(text).await.map_err(stale_or_cdp)?;
        Ok(())
    }

    async fn click(&self) -> Result<()> {
        self.inner.click().await.map_err(stale_or_cdp)?;
        Ok(())
    }

    async fn is_selected(&self) -> Result<bool> {
        let selected = self
            .call("function() { return !!(this.checked || this.selected); }")
            .await?;
        Ok(selected.as_bool().unwrap_or(false))
    }

    async fn set_file(&self, path: &str) -> Result<()> {
        let mut params = SetFileInputFilesParams::new(vec![path.to_string()]);
        params.backend_node_id = Some(self.inner.backend_node_id);
        self.page.execute(params).await.map_err(stale_or_cdp)?;
        Ok(())
    }

    async fn options(&self) -> Result<Vec<String>> {
        let json = self
            .call(
                "function() { return JSON.stringify(Array.from(this.options || [], o => o.text.trim())); }",
            )
            .await?;
        let json = json.as_str().unwrap_or("[]");
        Ok(serde_json::from_str(json)?)
    }

    async fn select_by_visible_text(&self, label: &str) -> Result<()> {
        let label_js = js_string(label)?;
        self.call_checked(
            format!(
                r#"function() {{
                    const option = Array.from(this.options || []).find(o => o.text.trim() === {label_js});
                    if (!option) return false;
                    option.selected = true;
                    this.dispatchEvent(new Event('input', {{ bubbles: true }}));
                    this.dispatchEvent(new Event('change', {{ bubbles: true }}));
                    return true;
                }}"#
            ),
            &format!("option '{label}'"),
        )
        .await
    }

    async fn deselect_all(&self) -> Result<()> {
        self.call_checked(
            r#"function() {
                if (!this.options) return false;
                for (const o of this.options) o.selected = false;
                this.dispatchEvent(new Event('change', { bubbles: true }));
                return true;
            }"#
            .to_string(),
            "select options",
        )
        .await
    }
}
