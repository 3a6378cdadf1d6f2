use mimalloc::MiMalloc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &tome::config::CONFIG;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let app = tome::Tome::bootstrap(cfg).await?;

    for report in app.sync_all().await? {
        info!(table = report.table, loaded = report.loaded, failed = report.failures.len(), "Loaded");
    }

    for engine in app.engines.all().iter() {
        info!(
            engine.id = ?engine.id,
            engine.name = %engine.name,
            engine.kind = %engine.kind,
            models = engine.models.len(),
            "Engine"
        );
    }
    for model in app.engines.models().snapshot().iter() {
        info!(model = %model.name, display_name = %model.display_name, engine = %model.engine_name, "Model");
    }
    for server in app.mcp_servers.all().iter() {
        info!(server = %server.name, command = %server.command_line(), "MCP server");
    }

    if let Some(message) = app.startup_warning.current() {
        warn!("{message}");
    }
    for toast in app.toasts.list().iter() {
        warn!(toast.kind = ?toast.kind, "{}", toast.message);
    }

    let check = tome::pages::load_registry_check(&app.registry).await;
    info!(ok = check.ok, "{}", check.details);

    if !app.is_up_to_date().await {
        info!("A newer Tome release is available");
    }

    app.shutdown();
    Ok(())
}
