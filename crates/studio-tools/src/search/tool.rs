use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::classify::{classify, QueryKind};
use super::images::ImageFallback;
use super::language::detect_language;
use super::provider::{SearchDepth, SearchProvider, SearchRequest, SearchResponse, SearchTopic};
use crate::error::{required_str, ToolError};
use crate::registry::{Tool, ToolDefinition, ToolKind};
use crate::SMART_SEARCH;

const WEB_NO_ANSWER: &str = "Nessuna risposta sintetizzata disponibile";
const NEWS_NO_ANSWER: &str = "Nessuna sintesi disponibile";
const WEB_FAILED: &str = "Non sono riuscito a completare la ricerca web richiesta.";
const NEWS_FAILED: &str = "Non sono riuscito a completare la ricerca notizie richiesta.";

const WEB_INSTRUCTION: &str = "Sei un assistente di ricerca esperto. Usa le fonti qui sopra per \
rispondere in modo accurato e completo, citando le fonti più rilevanti. Rispondi SEMPRE nella stessa \
lingua della domanda dell'utente: italiano se ha scritto in italiano, inglese se ha scritto in inglese. \
Le fonti sono già mostrate all'utente come schede: non ripeterle per intero, limita la risposta a una \
sintesi breve e chiara di poche frasi.";

const NEWS_INSTRUCTION: &str = "Sei un assistente specializzato nell'analisi di notizie ed eventi \
recenti. Riassumi gli sviluppi più importanti dando priorità alle notizie più recenti e indicando date \
e fonti quando disponibili. Rispondi SEMPRE nella stessa lingua della domanda dell'utente: italiano se \
ha scritto in italiano, inglese se ha scritto in inglese. Le notizie sono già mostrate all'utente come \
schede: non elencarle di nuovo, limita la risposta a una sintesi breve di poche frasi.";

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub max_results: usize,
    /// Per-result content is cut to this many characters
    pub content_chars: usize,
    pub search_depth: SearchDepth,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 5,
            content_chars: 500,
            search_depth: SearchDepth::Basic,
        }
    }
}

/// `smartSearch`: routes a query to web or news search
pub struct SmartSearchTool {
    definition: ToolDefinition,
    provider: Arc<dyn SearchProvider>,
    image_fallback: Option<ImageFallback>,
    settings: SearchSettings,
}

impl SmartSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        let definition = ToolDefinition::new(
            SMART_SEARCH,
            "Esegue una ricerca intelligente che seleziona automaticamente tra ricerca web generale e \
             ricerca notizie in base al contenuto della query. Usa sempre questo tool per cercare \
             informazioni aggiornate.",
        )
        .with_parameters(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "La query di ricerca da eseguire"
                }
            },
            "required": ["query"]
        }));

        Self {
            definition,
            provider,
            image_fallback: None,
            settings: SearchSettings::default(),
        }
    }

    pub fn with_image_fallback(mut self, fallback: ImageFallback) -> Self {
        self.image_fallback = Some(fallback);
        self
    }

    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Search and shape the payload. Provider failures become an error payload.
    pub async fn search(&self, query: &str) -> Value {
        let kind = classify(query);
        let language = detect_language(query);
        let topic = match kind {
            QueryKind::General => SearchTopic::General,
            QueryKind::News => SearchTopic::News,
        };

        let mut request = SearchRequest::new(query)
            .with_topic(topic)
            .with_max_results(self.settings.max_results)
            .with_include_domains(language.include_domains());
        request.search_depth = self.settings.search_depth;

        info!(query = %query, kind = kind.as_str(), language = language.code(), "Running search");
        let start = Instant::now();

        match self.provider.search(&request).await {
            Ok(response) => {
                let recovered = self.recover_images(&response).await;
                info!(
                    results = response.results.len(),
                    recovered_images = recovered.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Search completed"
                );
                self.shape(query, kind, response, &recovered)
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Search provider failed");
                error_payload(query, kind, &e.to_string())
            }
        }
    }

    async fn recover_images(&self, response: &SearchResponse) -> HashMap<String, String> {
        let Some(fallback) = &self.image_fallback else {
            return HashMap::new();
        };
        if response.has_images() {
            return HashMap::new();
        }
        let urls: Vec<String> = response
            .results
            .iter()
            .take(self.settings.max_results)
            .map(|r| r.url.clone())
            .collect();
        fallback.recover(&urls).await
    }

    fn shape(
        &self,
        query: &str,
        kind: QueryKind,
        response: SearchResponse,
        recovered: &HashMap<String, String>,
    ) -> Value {
        let items: Vec<Value> = response
            .results
            .into_iter()
            .take(self.settings.max_results)
            .map(|result| {
                let mut images = result.images;
                if let Some(image) = recovered.get(&result.url) {
                    if !images.contains(image) {
                        images.push(image.clone());
                    }
                }
                json!({
                    "title": result.title,
                    "url": result.url,
                    "content": truncate_chars(&result.content, self.settings.content_chars),
                    "images": images,
                    "rawContent": result.raw_content,
                    "publishedDate": result.published_date,
                    "relevanceScore": result.score,
                })
            })
            .collect();

        let (fallback_answer, instruction) = match kind {
            QueryKind::General => (WEB_NO_ANSWER, WEB_INSTRUCTION),
            QueryKind::News => (NEWS_NO_ANSWER, NEWS_INSTRUCTION),
        };
        let answer = response
            .answer
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| fallback_answer.to_string());
        let echoed_query = if response.query.is_empty() {
            query.to_string()
        } else {
            response.query
        };

        json!({
            "query": echoed_query,
            "answer": answer,
            results_key(kind): items,
            "followUpQuestions": response.follow_up_questions.unwrap_or_default(),
            "languageInstruction": instruction,
        })
    }
}

fn results_key(kind: QueryKind) -> &'static str {
    match kind {
        QueryKind::General => "sources",
        QueryKind::News => "news",
    }
}

fn error_payload(query: &str, kind: QueryKind, error: &str) -> Value {
    let answer = match kind {
        QueryKind::General => WEB_FAILED,
        QueryKind::News => NEWS_FAILED,
    };
    json!({
        "query": query,
        "error": error,
        "answer": answer,
        results_key(kind): [],
    })
}

/// Truncate on a character boundary
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[async_trait]
impl Tool for SmartSearchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    fn kind(&self) -> ToolKind {
        ToolKind::SmartSearch
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let query = required_str(&input, "query")?;
        Ok(self.search(query).await)
    }
}
