use std::net::SocketAddr;
use std::time::Duration;

use logsink_core::error::{LogsinkError, Result};
use tokio::net::TcpListener;

use crate::coordinator::Ingestor;
use crate::http;

pub async fn run_http_server(
    ingestor: Ingestor,
    addr: SocketAddr,
    request_timeout: Duration,
) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| LogsinkError::Io(format!("failed to bind {addr}: {e}")))?;
    serve(listener, ingestor, request_timeout).await
}

pub async fn serve(
    listener: TcpListener,
    ingestor: Ingestor,
    request_timeout: Duration,
) -> Result<()> {
    let local = listener
        .local_addr()
        .map_err(|e| LogsinkError::Io(format!("listener has no local addr: {e}")))?;
    tracing::info!(addr = %local, "http server listening");

    axum::serve(listener, http::router(ingestor, request_timeout))
        .await
        .map_err(|e| LogsinkError::Io(format!("HTTP server failed: {e}")))
}
