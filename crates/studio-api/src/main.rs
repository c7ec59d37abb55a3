use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use studio_api::{
    auth::SupabaseAuthenticator,
    build_router,
    config::{Config, PersistenceBackend},
    state::AppState,
};
use studio_connect::{ComposioClient, ConnectorService};
use studio_graph::{Graph, ToolResolver};
use studio_llm::{ChatClient, ClientFactory, ProviderConfig};
use studio_persist::{MemoryPersistenceClient, PersistenceClient};
use studio_tools::search::{HttpImageFetcher, ImageFallback, TavilyClient};
use studio_tools::{SmartSearchTool, TaskCompletedTool, TaskPlanningTool, ToolCatalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Studio API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let llm_client = build_chat_client(&config)?;
    let catalog = build_catalog(&config, Arc::clone(&llm_client))?;

    let connectors = match &config.secrets.composio_api_key {
        Some(key) => {
            let mut client = ComposioClient::with_timeout(key, Duration::from_millis(config.connector.timeout_ms))?;
            if let Some(base_url) = &config.connector.base_url {
                client = client.with_base_url(base_url)?;
            }
            tracing::info!("Connector integration enabled");
            Some(ConnectorService::new(Arc::new(client)))
        }
        None => {
            tracing::warn!("COMPOSIO_API_KEY not set; connector tools disabled");
            None
        }
    };

    let mut resolver = ToolResolver::new(catalog);
    if let Some(service) = &connectors {
        resolver = resolver.with_connectors(service.clone());
    }

    let persistence = build_persistence(&config).await?;

    let graph = Graph::builder()
        .llm_client(llm_client)
        .tools(resolver)
        .config((&config.agent).into())
        .timezone(config.agent.timezone.clone())
        .with_persistence(Arc::clone(&persistence))
        .build()?;

    let authenticator = Arc::new(SupabaseAuthenticator::new(
        config.secrets.supabase_url.clone(),
        config.secrets.supabase_anon_key.clone(),
    )?);

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let mut state = AppState::new(config, persistence, graph, authenticator);
    if let Some(service) = connectors {
        state = state.with_connectors(service);
    }

    let app = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_chat_client(config: &Config) -> anyhow::Result<Arc<dyn ChatClient>> {
    let mut provider = ProviderConfig::openrouter(config.secrets.llm_api_key.clone())
        .with_request_timeout_ms(config.llm.request_timeout_ms);
    if let Some(base_url) = &config.llm.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    tracing::info!(base_url = %provider.resolved_base_url(), "Initializing LLM client");
    ClientFactory::create_chat_client(provider)
}

fn build_catalog(config: &Config, llm_client: Arc<dyn ChatClient>) -> anyhow::Result<ToolCatalog> {
    let mut catalog = ToolCatalog::new()
        .with_tool(Arc::new(
            TaskPlanningTool::new(llm_client).with_model(config.llm.planner_model.clone()),
        ))
        .with_tool(Arc::new(TaskCompletedTool::new()));

    match &config.secrets.tavily_api_key {
        Some(key) => {
            let provider = TavilyClient::with_timeout(key.clone(), Duration::from_millis(config.search.timeout_ms))?;
            let fallback_config = config.search.image_fallback();
            let fetcher = HttpImageFetcher::new(fallback_config.fetch_timeout)?;
            let search = SmartSearchTool::new(Arc::new(provider))
                .with_settings(config.search.settings())
                .with_image_fallback(ImageFallback::new(Arc::new(fetcher), fallback_config));
            catalog = catalog.with_tool(Arc::new(search));
        }
        None => tracing::warn!("TAVILY_API_KEY not set; smartSearch disabled"),
    }

    Ok(catalog)
}

async fn build_persistence(config: &Config) -> anyhow::Result<Arc<dyn PersistenceClient>> {
    match config.persistence.backend {
        PersistenceBackend::Memory => {
            tracing::info!("Using in-memory persistence");
            Ok(Arc::new(MemoryPersistenceClient::new()))
        }
        #[cfg(feature = "mongodb")]
        PersistenceBackend::Mongodb => {
            let uri = config
                .secrets
                .mongodb_uri
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("MONGODB_URI is required for the mongodb backend"))?;
            tracing::info!("Connecting to MongoDB");
            let client = studio_persist::MongoPersistenceClient::connect(uri, &config.persistence.database).await?;
            tracing::info!("MongoDB connected");
            Ok(Arc::new(client))
        }
        #[cfg(not(feature = "mongodb"))]
        PersistenceBackend::Mongodb => {
            anyhow::bail!("The mongodb backend needs the `mongodb` feature")
        }
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        }
        _ => {
            registry.with(tracing_subscriber::fmt::layer().pretty()).init();
        }
    }
}
