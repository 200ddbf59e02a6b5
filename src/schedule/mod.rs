pub mod batcher;
pub mod locator;
pub mod scanner;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::config::ScheduleConfig;

pub use batcher::{into_batches, DeliveryBatch, MediaItem};
pub use scanner::ImageScanner;

/// Source of the schedule page markup
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain HTTP page source with a bounded request time
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(config: &ScheduleConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to load page {}", url))?;

        // Error pages are scanned like any other body and simply match nothing
        info!("Schedule page response status: {}", response.status());

        response
            .text()
            .await
            .with_context(|| format!("Failed to read page body from {}", url))
    }
}

/// Fetches the schedule page and extracts absolute image URLs
pub struct ScheduleService {
    source: Arc<dyn PageSource>,
    scanner: ImageScanner,
    page_url: String,
    base_url: String,
}

impl ScheduleService {
    pub fn new(source: Arc<dyn PageSource>, config: &ScheduleConfig) -> Self {
        Self {
            source,
            scanner: ImageScanner::default(),
            page_url: config.page_url.clone(),
            base_url: config.base_url.clone(),
        }
    }

    /// Resolved image URLs in page order. Fails only when the page
    /// cannot be fetched; malformed markup yields what was found before it.
    pub async fn image_urls(&self) -> Result<Vec<String>> {
        let html = self.source.fetch(&self.page_url).await?;
        let urls = self
            .scanner
            .scan(&html)
            .iter()
            .map(|reference| locator::resolve(reference, &self.base_url))
            .collect::<Vec<_>>();

        for url in &urls {
            info!("Schedule image URL: {}", url);
        }
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticPage;

    fn config() -> ScheduleConfig {
        ScheduleConfig {
            page_url: "http://example.test/schedule/".to_string(),
            base_url: "https://nklpis.ru".to_string(),
            fetch_timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn test_image_urls_are_resolved_against_base() {
        let page = StaticPage::ok(&format!(
            r#"<div class="white-box padding-box"><img src="{}"><img src="{}"></div>"#,
            scanner::ALLOWED_IMAGES[1],
            scanner::ALLOWED_IMAGES[0],
        ));
        let service = ScheduleService::new(Arc::new(page), &config());

        let urls = service.image_urls().await.unwrap();
        assert_eq!(
            urls,
            vec![
                "https://nklpis.ru/upload/images/index--img(389).png",
                "https://nklpis.ru/upload/images/index--img(391).png",
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let service = ScheduleService::new(Arc::new(StaticPage::failing()), &config());
        assert!(service.image_urls().await.is_err());
    }

    #[tokio::test]
    async fn test_requests_configured_page() {
        let page = Arc::new(StaticPage::ok("<html></html>"));
        let service = ScheduleService::new(page.clone(), &config());

        assert!(service.image_urls().await.unwrap().is_empty());
        assert_eq!(page.requested(), vec!["http://example.test/schedule/"]);
    }
}
