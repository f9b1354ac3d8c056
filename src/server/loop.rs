// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;
use crate::store::DocumentStore;

/// Accept loop. Returns after `shutdown` resolves and the listener is
/// closed; connections already accepted keep running on their own tasks.
pub async fn run<S, F>(
    listener: TcpListener,
    state: Arc<AppState<S>>,
    shutdown: F,
) -> std::io::Result<()>
where
    S: DocumentStore,
    F: Future<Output = ()> + Send,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    let local_addr = listener.local_addr()?;
    drop(listener);
    logger::log_info(&format!("[Shutdown] Stopped listening on {local_addr}"));
    logger::log_shutdown(active_connections.load(Ordering::SeqCst));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;
    use crate::store::{Document, MemoryStore};
    use http_body_util::{BodyExt, Empty};
    use hyper::body::Bytes;
    use hyper::StatusCode;
    use hyper_util::client::legacy::Client;
    use hyper_util::rt::TokioExecutor;
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    fn spawn_server(config: Config) -> (SocketAddr, oneshot::Sender<()>) {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(config, MemoryStore::new()));
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(run(listener, state, async move {
            let _ = rx.await;
        }));
        (addr, tx)
    }

    /// Send a health check on `stream` and read the full JSON response
    async fn health_check(stream: &mut TcpStream) -> String {
        stream
            .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut response = Vec::new();
        let mut buf = [0u8; 1024];
        while !response.ends_with(b"}") {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed mid-response");
            response.extend_from_slice(&buf[..n]);
        }
        String::from_utf8(response).unwrap()
    }

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.logging.access_log = false;
        config
    }

    #[tokio::test]
    async fn test_serves_requests_until_shutdown() {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();

        let mut config = Config::default();
        config.logging.access_log = false;
        let store = MemoryStore::new()
            .with(
                Document::ReportsList,
                json!({"type": "FeatureCollection", "features": []}),
            )
            .with(Document::ReportDetails, json!({"id": "R1"}));
        let state = Arc::new(AppState::new(config, store));

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(run(listener, state, async move {
            let _ = rx.await;
        }));

        let client = Client::builder(TokioExecutor::new()).build_http::<Empty<Bytes>>();

        let response = client
            .get(format!("http://{addr}/api/reports").parse().unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"type": "FeatureCollection", "features": []}));

        let response = client
            .get(format!("http://{addr}/api/reports/R9").parse().unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_keep_alive_outlives_read_and_write_timeouts() {
        let mut config = quiet_config();
        config.performance.read_timeout = 1;
        config.performance.write_timeout = 1;
        config.performance.keep_alive_timeout = 10;
        let (addr, tx) = spawn_server(config);

        let mut stream = TcpStream::connect(addr).await.unwrap();
        assert!(health_check(&mut stream).await.starts_with("HTTP/1.1 200"));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(health_check(&mut stream).await.starts_with("HTTP/1.1 200"));

        tx.send(()).unwrap();
    }

    #[tokio::test]
    async fn test_idle_keep_alive_connection_is_closed() {
        let mut config = quiet_config();
        config.performance.keep_alive_timeout = 1;
        let (addr, tx) = spawn_server(config);

        let mut stream = TcpStream::connect(addr).await.unwrap();
        assert!(health_check(&mut stream).await.starts_with("HTTP/1.1 200"));

        let mut buf = [0u8; 64];
        let read = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
            .await
            .expect("idle connection was not closed");
        assert!(matches!(read, Ok(0) | Err(_)));

        tx.send(()).unwrap();
    }
}
