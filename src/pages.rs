//! Data loaders for the UI pages.
//!
//! Loaders never fail: an error becomes [`PageData::load_error`] next to empty data so the
//! page can render a message instead of breaking.

use serde::Serialize;
use std::sync::Arc;
use tome_schema::{CompactServer, ConfigField, Pagination, Server};
use tracing::warn;

use crate::error::TomeError;
use crate::models::{Engine, Engines, McpServer, Model};
use crate::persist::Repository;
use crate::registry::RegistryClient;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageData<T> {
    pub data: T,
    pub load_error: Option<String>,
}

impl<T: Default> PageData<T> {
    fn from_result(page: &'static str, result: Result<T, TomeError>) -> Self {
        match result {
            Ok(data) => Self {
                data,
                load_error: None,
            },
            Err(e) => {
                warn!(page, error = %e, "Page load failed");
                Self {
                    data: T::default(),
                    load_error: Some(e.to_string()),
                }
            }
        }
    }
}

/// One page of registry results with its paging info.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerPage {
    pub servers: Vec<CompactServer>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryCheck {
    pub ok: bool,
    pub details: String,
}

pub async fn load_registry_servers(client: &RegistryClient, page: u32) -> PageData<ServerPage> {
    let result = client.servers(page).await.map(|list| ServerPage {
        servers: list.servers,
        pagination: Some(list.pagination),
    });
    PageData::from_result("registry", result)
}

pub async fn load_registry_search(
    client: &RegistryClient,
    text: &str,
    page: u32,
) -> PageData<ServerPage> {
    let result = client.search(text, page).await.map(|list| ServerPage {
        servers: list.servers,
        pagination: Some(list.pagination),
    });
    PageData::from_result("registry-search", result)
}

pub async fn load_server(client: &RegistryClient, qualified_name: &str) -> PageData<Option<Server>> {
    let result = client.server(qualified_name).await.map(Some);
    PageData::from_result("registry-server", result)
}

/// Install form for a registry server: the stdio connection's config fields, pre-filled
/// with schema defaults. A server without a stdio connection has no fields.
pub async fn load_server_config(
    client: &RegistryClient,
    qualified_name: &str,
) -> PageData<Vec<ConfigField>> {
    let result = client.server(qualified_name).await.map(|server| {
        server
            .stdio_connection()
            .and_then(|conn| conn.config_schema.as_ref())
            .map(|schema| schema.fields())
            .unwrap_or_default()
    });
    PageData::from_result("registry-server-config", result)
}

pub async fn load_registry_check(client: &RegistryClient) -> RegistryCheck {
    let mode = if client.is_authenticated() {
        "authenticated"
    } else {
        "anonymous, local servers only"
    };
    match client.check().await {
        Ok(()) => RegistryCheck {
            ok: true,
            details: format!("Connected to {} ({mode})", client.base_url()),
        },
        Err(e) => RegistryCheck {
            ok: false,
            details: format!("Cannot reach {}: {e}", client.base_url()),
        },
    }
}

pub async fn load_engines(engines: &Engines) -> PageData<Arc<Vec<Engine>>> {
    let result = engines.sync().await.map(|_| engines.all());
    PageData::from_result("engines", result)
}

pub async fn load_models(engines: &Engines) -> PageData<Arc<Vec<Model>>> {
    let result = engines.sync().await.map(|_| engines.models().snapshot());
    PageData::from_result("models", result)
}

pub async fn load_mcp_servers(servers: &Repository<McpServer>) -> PageData<Arc<Vec<McpServer>>> {
    let result = servers.sync().await.map(|_| servers.all());
    PageData::from_result("mcp-servers", result)
}
