use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::error::SearchError;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; StudioBot/1.0)";

static META_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("META_TAG is a compile-time constant"));

static TAG_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z][a-z0-9:_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("TAG_ATTR is a compile-time constant")
});

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]+)"|'([^']+)')"#)
        .expect("IMG_SRC is a compile-time constant")
});

const OG_KEYS: &[&str] = &["og:image", "og:image:url", "og:image:secure_url"];
const TWITTER_KEYS: &[&str] = &["twitter:image", "twitter:image:src"];
const SKIPPED_IMG_HINTS: &[&str] = &["icon", "logo", "pixel"];

/// Find a representative image in a page.
///
/// Order: Open Graph meta, Twitter meta, then the first `<img>` that is not an
/// icon, logo or tracking pixel. The result is absolute, resolved against `page_url`.
pub fn extract_image_from_html(html: &str, page_url: &str) -> Option<String> {
    let metas: Vec<HashMap<String, String>> = META_TAG
        .find_iter(html)
        .map(|tag| parse_attributes(tag.as_str()))
        .collect();

    let from_meta = |keys: &[&str]| {
        metas.iter().find_map(|attrs| {
            let key = attrs.get("property").or_else(|| attrs.get("name"))?;
            if !keys.contains(&key.to_lowercase().as_str()) {
                return None;
            }
            attrs.get("content").filter(|c| !c.trim().is_empty()).cloned()
        })
    };

    if let Some(src) = from_meta(OG_KEYS).or_else(|| from_meta(TWITTER_KEYS)) {
        if let Some(url) = resolve(&src, page_url) {
            return Some(url);
        }
    }

    IMG_SRC
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().to_string()))
        .filter(|src| !src.starts_with("data:"))
        .filter(|src| {
            let lower = src.to_lowercase();
            !SKIPPED_IMG_HINTS.iter().any(|hint| lower.contains(hint))
        })
        .find_map(|src| resolve(&src, page_url))
}

fn parse_attributes(tag: &str) -> HashMap<String, String> {
    TAG_ATTR
        .captures_iter(tag)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_lowercase();
            let value = caps.get(2).or_else(|| caps.get(3))?.as_str().to_string();
            Some((name, value))
        })
        .collect()
}

fn resolve(src: &str, page_url: &str) -> Option<String> {
    let src = src.trim().replace("&amp;", "&");
    let resolved = match Url::parse(&src) {
        Ok(url) => url,
        Err(_) => Url::parse(page_url).ok()?.join(&src).ok()?,
    };
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

/// Looks up an image for a result page
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_image(&self, page_url: &str) -> Result<Option<String>, SearchError>;
}

pub struct HttpImageFetcher {
    http_client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, SearchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_image(&self, page_url: &str) -> Result<Option<String>, SearchError> {
        let response = self.http_client.get(page_url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let html = response.text().await?;
        Ok(extract_image_from_html(&html, page_url))
    }
}

#[derive(Debug, Clone)]
pub struct ImageFallbackConfig {
    /// Result pages tried at most
    pub max_urls: usize,
    /// Stop once this many images are found
    pub target_images: usize,
    pub concurrency: usize,
    pub fetch_timeout: Duration,
}

impl Default for ImageFallbackConfig {
    fn default() -> Self {
        Self {
            max_urls: 8,
            target_images: 4,
            concurrency: 4,
            fetch_timeout: Duration::from_secs(6),
        }
    }
}

/// Best-effort image recovery for results that came back without any
pub struct ImageFallback {
    fetcher: Arc<dyn ImageFetcher>,
    config: ImageFallbackConfig,
}

impl ImageFallback {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, config: ImageFallbackConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &ImageFallbackConfig {
        &self.config
    }

    /// Map of page URL to recovered image URL. Failures and timeouts are skipped.
    pub async fn recover(&self, page_urls: &[String]) -> HashMap<String, String> {
        let timeout = self.config.fetch_timeout;
        let mut pending = stream::iter(page_urls.iter().take(self.config.max_urls).cloned())
            .map(|url| {
                let fetcher = Arc::clone(&self.fetcher);
                async move {
                    let outcome = tokio::time::timeout(timeout, fetcher.fetch_image(&url)).await;
                    (url, outcome)
                }
            })
            .buffer_unordered(self.config.concurrency.max(1));

        let mut found = HashMap::new();
        while let Some((url, outcome)) = pending.next().await {
            match outcome {
                Ok(Ok(Some(image))) => {
                    found.insert(url, image);
                    if found.len() >= self.config.target_images {
                        break;
                    }
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => debug!(url = %url, error = %e, "Image extraction failed"),
                Err(_) => debug!(url = %url, "Image extraction timed out"),
            }
        }

        debug!(recovered = found.len(), "Image fallback finished");
        found
    }
}
