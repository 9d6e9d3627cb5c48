use crate::config::Config;
use crate::http::ApiError;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;

const WINDOW_WIDTH: u32 = 1920;
const WINDOW_HEIGHT: u32 = 1080;

/// Launch a headless Chrome and drive its CDP event loop in the background.
pub async fn create_cdp_browser(config: &Config) -> Result<Browser, ApiError> {
    tracing::debug!(
        chrome_path = config.chrome_path.as_deref().unwrap_or("auto"),
        headless = config.headless,
        "Launching Chrome"
    );

    let args = vec![
        "--no-sandbox",
        "--disable-dev-shm-usage",
        "--disable-gpu",
        "--hide-scrollbars",
        "--font-render-hinting=none",
    ];

    let mut builder = BrowserConfig::builder()
        .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
        .args(args);
    if let Some(path) = &config.chrome_path {
        builder = builder.chrome_executable(path);
    }
    if !config.headless {
        builder = builder.with_head();
    }

    let browser_config = builder
        .build()
        .map_err(|e| ApiError::Render(format!("Browser config error: {}", e)))?;

    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| ApiError::Render(format!("Failed to launch Chrome: {}", e)))?;

    // The handler must be polled or every CDP call hangs.
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::warn!("CDP event error: {:?}", e);
            }
        }
        tracing::debug!("CDP handler finished");
    });

    Ok(browser)
}

/// Poll until the document and all of its images have finished loading.
/// Gives up quietly after `timeout_secs`.
pub async fn wait_for_assets(page: &Page, timeout_secs: u64) {
    let js = r#"
        (() => document.readyState === 'complete'
            && Array.from(document.images).every(img => img.complete))()
    "#;

    for _ in 0..(timeout_secs * 4) {
        if let Ok(result) = page.evaluate(js).await {
            if let Ok(true) = result.into_value::<bool>() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    tracing::warn!("Assets still loading after {} seconds, printing anyway", timeout_secs);
}
