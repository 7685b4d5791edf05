use std::sync::Arc;

use tracing::{error, info};

use recall_cli::{init_tracing, load_settings, router};
use recall_search::Service;

async fn serve(service: Arc<Service>, addr: String) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = load_settings()?;
    // Built outside the runtime: the blocking HTTP clients must not be created or dropped inside it.
    let service = Arc::new(Service::from_settings(&settings)?);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    tokio::runtime::Runtime::new()?.block_on(serve(Arc::clone(&service), addr))?;
    info!("Server stopped");
    Ok(())
}
