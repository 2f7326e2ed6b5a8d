use async_trait::async_trait;
use chromiumoxide::page::Page as CrPage;

use crate::driver::FormDriver;
use crate::element::Element;
use crate::error::{Error, Result};

/// Wrapper around a chromiumoxide Page implementing [`FormDriver`].
pub struct Page {
    inner: CrPage,
}

impl Page {
    pub(crate) fn new(inner: CrPage) -> Self {
        Self { inner }
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Navigate to the given URL and wait for the page to load.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.inner
            .goto(url)
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;
        Ok(())
    }

    /// Get the current page title.
    pub async fn title(&self) -> Result<String> {
        let result = self
            .inner
            .evaluate("document.title")
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(result.into_value::<String>().unwrap_or_default())
    }

    // ── Element Queries ─────────────────────────────────────────────

    /// Find an element matching the given CSS selector.
    pub async fn find_element(&self, selector: &str) -> Result<Element> {
        let el = self
            .inner
            .find_element(selector)
            .await
            .map_err(|e| Error::ElementNotFound(format!("{selector}: {e}")))?;
        Ok(Element::new(el, self.inner.clone()))
    }

    /// Find all elements matching the given CSS selector.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<Element>> {
        let els = self
            .inner
            .find_elements(selector)
            .await
            .map_err(|e| Error::ElementNotFound(format!("{selector}: {e}")))?;
        Ok(els
            .into_iter()
            .map(|el| Element::new(el, self.inner.clone()))
            .collect())
    }
}

#[async_trait]
impl FormDriver for Page {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.goto(url).await
    }

    async fn find_one(&self, selector: &str) -> Result<Element> {
        self.find_element(selector).await
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Element>> {
        self.find_elements(selector).await
    }
}
