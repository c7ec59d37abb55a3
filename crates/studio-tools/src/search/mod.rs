//! Unified web/news search.
//!
//! A query is classified as news or general without a model call, sent to the
//! search provider with a language-specific domain allow-list, and shaped into
//! the payload the chat model reads. Missing images are recovered from result
//! pages' meta tags on a best-effort basis.

pub mod classify;
pub mod images;
pub mod language;
pub mod provider;
pub mod tool;

pub use classify::{classify, is_news_query, QueryKind};
pub use images::{extract_image_from_html, HttpImageFetcher, ImageFallback, ImageFallbackConfig, ImageFetcher};
pub use language::{detect_language, Language};
pub use provider::{SearchDepth, SearchProvider, SearchRequest, SearchResponse, SearchResult, SearchTopic, TavilyClient};
pub use tool::{SearchSettings, SmartSearchTool};
