// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How often the drain phase re-checks the connection counter
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop until `state.shutdown_signal` fires.
///
/// After the signal the listener is closed immediately, then active
/// connections get up to `performance.shutdown_timeout` seconds to finish.
/// Returns the number of connections still open when the wait ended.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
) -> usize {
    let shutdown = Arc::clone(&state.shutdown_signal);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.notified() => break,
        }
    }

    drop(listener);
    logger::log_shutdown_started(active_connections.load(Ordering::SeqCst));

    let deadline = tokio::time::Instant::now()
        + Duration::from_secs(state.config.performance.shutdown_timeout);
    drain_connections(&active_connections, deadline).await
}

/// Wait until the counter reaches zero or the deadline passes
async fn drain_connections(
    active_connections: &AtomicUsize,
    deadline: tokio::time::Instant,
) -> usize {
    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        let left = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining == 0 || left.is_zero() {
            logger::log_shutdown_complete(remaining);
            return remaining;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL.min(left)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn state() -> Arc<AppState> {
        let mut cfg = Config::load_from("does-not-exist/shop-config").unwrap();
        cfg.logging.access_log = false;
        cfg.performance.shutdown_timeout = 1;
        Arc::new(AppState::new(&cfg).unwrap())
    }

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = state();
        let counter = Arc::new(AtomicUsize::new(0));

        let server = tokio::spawn(start_server_loop(
            listener,
            Arc::clone(&state),
            Arc::clone(&counter),
        ));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /course/abc HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 404"), "{response}");

        state.shutdown_signal.notify_one();
        let remaining = server.await.unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_drain_times_out() {
        let counter = AtomicUsize::new(2);
        let deadline = tokio::time::Instant::now() + Duration::from_millis(120);
        assert_eq!(drain_connections(&counter, deadline).await, 2);
    }
}
