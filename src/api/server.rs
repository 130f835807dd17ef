//! HTTP server lifecycle: bind, serve, shut down on Ctrl-C.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use super::router::careflow_router;
use crate::core_state::CoreState;

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(core: Arc<CoreState>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, core, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, core: Arc<CoreState>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    let app = careflow_router(core);

    tracing::info!(%addr, "CareFlow server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("CareFlow server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::sync::oneshot;

    use crate::core_state::testing::{test_core_state, test_settings};
    use crate::db::MemoryStore;
    use crate::pipeline::llm::MockLlmClient;

    #[tokio::test]
    async fn serves_health_and_stops_on_signal() {
        let dir = tempfile::tempdir().unwrap();
        let core = Arc::new(test_core_state(
            test_settings(dir.path()),
            Arc::new(MemoryStore::new()),
            Arc::new(MockLlmClient::new("[]")),
            Arc::new(MockLlmClient::new("{}")),
        ));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve_on(listener, core, async move {
            let _ = shutdown_rx.await;
        }));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"), "got {response}");
        assert!(response.contains("\"status\":\"healthy\""));

        shutdown_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
