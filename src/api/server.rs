//! HTTP server lifecycle: bind, serve the API router, shut down gracefully.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, ctx: ApiContext) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, ctx, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, ctx: ApiContext, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    let app = api_router(ctx);

    tracing::info!(%addr, "API server started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("API server received shutdown signal");
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
