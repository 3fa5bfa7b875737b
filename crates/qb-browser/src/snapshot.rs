//! Page snapshot over a live tab
//!
//! Implements the core's read-only [`PageSnapshot`] interface for a
//! `headless_chrome` tab. The snapshot only reads; navigation and
//! lifecycle stay with the operator and [`crate::BrowserSession`].

use std::sync::Arc;

use headless_chrome::Tab;
use tracing::debug;

use crate::error::BrowserError;

/// JS that returns the visible text of every body element, document order
const ELEMENT_TEXTS_JS: &str =
    "JSON.stringify(Array.from(document.querySelectorAll('body *')).map(el => el.innerText || ''))";

/// Read-only snapshot capability over one browser tab
pub struct TabSnapshot {
    tab: Arc<Tab>,
}

impl TabSnapshot {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }
}

impl qb_core::PageSnapshot for TabSnapshot {
    fn render_html(&self) -> qb_core::Result<String> {
        let html = self
            .tab
            .get_content()
            .map_err(|e| BrowserError::Extraction(format!("Failed to get page content: {}", e)))?;

        debug!(len = html.len(), "Fetched page markup");

        Ok(html)
    }

    fn element_texts(&self) -> qb_core::Result<Vec<String>> {
        let result = self
            .tab
            .evaluate(ELEMENT_TEXTS_JS, false)
            .map_err(|e| BrowserError::Extraction(format!("Element query failed: {}", e)))?;

        let json = match result.value {
            Some(serde_json::Value::String(s)) => s,
            other => {
                return Err(BrowserError::Extraction(format!(
                    "Element query returned unexpected value: {:?}",
                    other
                ))
                .into());
            }
        };

        let texts: Vec<String> = serde_json::from_str(&json).map_err(|e| {
            BrowserError::Extraction(format!("Failed to decode element texts: {}", e))
        })?;

        debug!(count = texts.len(), "Collected element texts");

        Ok(texts)
    }
}
