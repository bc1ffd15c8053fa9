//! HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::relay::Relay;
use crate::{RelayError, Result};

use super::handlers::AppState;
use super::router::create_app;

/// Web server for the polling endpoints and the status webhook.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Shared secret for polling endpoints.
    secret: String,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &ServerConfig, relay: Arc<Relay>) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| {
                RelayError::Config(format!(
                    "invalid server address {}:{}: {}",
                    config.host, config.port, e
                ))
            })?;

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(relay)),
            secret: config.secret.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let router = create_app(self.app_state, &self.secret);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let router = create_app(self.app_state, &self.secret);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::HttpFetcher;
    use crate::config::{FetchConfig, TelegramConfig};
    use crate::store::MemoryStore;
    use crate::telegram::TelegramClient;

    fn relay() -> Arc<Relay> {
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let messenger = TelegramClient::new(&TelegramConfig::default()).unwrap();
        Arc::new(Relay::new(
            Arc::new(MemoryStore::new()),
            Arc::new(messenger),
            Arc::new(fetcher),
            Vec::new(),
        ))
    }

    fn create_test_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            secret: "test-secret".to_string(),
        }
    }

    #[test]
    fn test_web_server_new() {
        let server = WebServer::new(&create_test_config(), relay()).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[test]
    fn test_web_server_invalid_host() {
        let mut config = create_test_config();
        config.host = "not a host".to_string();
        let err = WebServer::new(&config, relay()).err().unwrap();
        assert!(matches!(err, RelayError::Config(_)));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let server = WebServer::new(&create_test_config(), relay()).unwrap();
        let addr = server.run_with_addr().await.unwrap();
        assert_ne!(addr.port(), 0);

        let body = reqwest::get(format!("http://{}/health", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "OK");
    }
}
