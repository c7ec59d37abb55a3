//! Connector capability: apps a user has authorized through Composio, surfaced
//! to the agent as dynamically built tools.

pub mod apps;
pub mod client;
pub mod error;
pub mod provider;
pub mod service;
pub mod tool;

pub use apps::{fallback_apps, ConnectorApp};
pub use client::{ComposioClient, COMPOSIO_API_BASE};
pub use error::ConnectorError;
pub use provider::{ConnectorProvider, RemoteTool};
pub use service::{ConnectorService, ConnectorToolSet};
pub use tool::ConnectorTool;
