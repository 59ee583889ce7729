use std::convert::Infallible;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming as HyperIncomingBody;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::metrics::Metrics;

/// Bind the metrics listener. Done before spawning so that a busy port
/// stops the process at startup.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind metrics server to {addr}"))?;
    log::info!("Metrics server listening on {}", listener.local_addr()?);
    Ok(listener)
}

pub async fn run(
    listener: TcpListener,
    metrics: Arc<Metrics>,
    cancel: CancellationToken,
) {
    loop {
        let (tcp_stream, remote_addr) = tokio::select! {
            () = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    log::error!("Error accepting connection: {e}");
                    continue;
                }
            },
        };

        let io = TokioIo::new(tcp_stream);
        let metrics = Arc::clone(&metrics);
        tokio::spawn(async move {
            let service =
                service_fn(move |req| handle_request(req, Arc::clone(&metrics)));
            if let Err(err) =
                http1::Builder::new().serve_connection(io, service).await
            {
                let is_io_error = err
                    .source()
                    .is_some_and(|source| source.is::<std::io::Error>());
                if !err.is_incomplete_message() && !is_io_error {
                    log::error!(
                        "Error serving connection from {remote_addr}: {err}"
                    );
                }
            }
        });
    }
    log::info!("Metrics server stopped");
}

async fn handle_request(
    req: HyperRequest<HyperIncomingBody>,
    metrics: Arc<Metrics>,
) -> Result<HyperResponse<Full<Bytes>>, Infallible> {
    let (status, content_type, body) =
        match (req.method(), req.uri().path()) {
            (&Method::GET, "/metrics") => (
                StatusCode::OK,
                "text/plain; version=0.0.4",
                metrics.render(),
            ),
            _ => (
                StatusCode::NOT_FOUND,
                "text/plain; charset=utf-8",
                "Not Found".to_string(),
            ),
        };

    let mut response = HyperResponse::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static(content_type),
    );
    Ok(response)
}
