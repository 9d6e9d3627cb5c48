use crate::browser::{create_cdp_browser, wait_for_assets};
use crate::config::Config;
use crate::http::ApiError;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetScriptExecutionDisabledParams;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use std::sync::Arc;

const MM_PER_INCH: f64 = 25.4;
const ASSET_WAIT_SECS: u64 = 10;

/// Paper geometry handed to the PDF printer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    pub width_mm: f64,
    pub height_mm: f64,
    pub margin_mm: f64,
    pub scale: f64,
}

impl PageSpec {
    /// A1 landscape (841 x 594 mm), no margins.
    pub fn a1_landscape(scale: f64) -> Self {
        Self {
            width_mm: 841.0,
            height_mm: 594.0,
            margin_mm: 0.0,
            scale,
        }
    }

    fn to_print_params(self) -> PrintToPdfParams {
        let margin = self.margin_mm / MM_PER_INCH;
        PrintToPdfParams {
            landscape: Some(false),
            print_background: Some(true),
            scale: Some(self.scale),
            paper_width: Some(self.width_mm / MM_PER_INCH),
            paper_height: Some(self.height_mm / MM_PER_INCH),
            margin_top: Some(margin),
            margin_bottom: Some(margin),
            margin_left: Some(margin),
            margin_right: Some(margin),
            prefer_css_page_size: Some(false),
            ..Default::default()
        }
    }
}

/// Page scripts stay off: the HTML embeds caller-supplied markup. DevTools
/// evaluation used by `wait_for_assets` is not affected.
fn disable_page_scripts() -> SetScriptExecutionDisabledParams {
    SetScriptExecutionDisabledParams { value: true }
}

/// Turns an HTML document into PDF bytes.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str, page: PageSpec) -> Result<Vec<u8>, ApiError>;
}

/// Prints through a freshly launched headless Chrome per document.
pub struct ChromePdfRenderer {
    config: Arc<Config>,
}

impl ChromePdfRenderer {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PdfRenderer for ChromePdfRenderer {
    async fn render(&self, html: &str, spec: PageSpec) -> Result<Vec<u8>, ApiError> {
        let mut browser = create_cdp_browser(&self.config).await?;

        let result = async {
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ApiError::Render(format!("Failed to open page: {}", e)))?;
            page.execute(disable_page_scripts())
                .await
                .map_err(|e| ApiError::Render(format!("Failed to disable scripts: {}", e)))?;
            page.set_content(html)
                .await
                .map_err(|e| ApiError::Render(format!("Failed to load HTML: {}", e)))?;
            wait_for_assets(&page, ASSET_WAIT_SECS).await;

            page.pdf(spec.to_print_params())
                .await
                .map_err(|e| ApiError::Render(format!("Failed to print PDF: {}", e)))
        }
        .await;

        if let Err(e) = browser.close().await {
            tracing::warn!("Failed to close Chrome: {}", e);
        }
        let _ = browser.wait().await;

        let bytes = result?;
        tracing::debug!(bytes = bytes.len(), "PDF printed");
        Ok(bytes)
    }
}
