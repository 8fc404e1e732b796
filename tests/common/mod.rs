//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use task_api::config::AppConfig;
use task_api::http::HttpServer;
use task_api::lifecycle::Shutdown;
use task_api::tasks::TaskStore;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub store: Arc<TaskStore>,
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(AppConfig::default()).await
    }

    pub async fn start_with(mut config: AppConfig) -> Self {
        config.listener.bind_address = "127.0.0.1:0".to_string();

        let listener = TcpListener::bind(&config.listener.bind_address)
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();

        let server = HttpServer::new(config).unwrap();
        let store = server.state().store.clone();

        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        let handle = tokio::spawn(async move {
            server.run(listener, receiver).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
            .unwrap();

        Self {
            addr,
            client,
            store,
            shutdown,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Create a task through the API and return its id.
    pub async fn create(&self, title: &str) -> u64 {
        let response = self
            .client
            .post(self.url("/tasks"))
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);

        let body: serde_json::Value = response.json().await.unwrap();
        body["task"]["id"].as_u64().unwrap()
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        self.handle.await.unwrap();
    }
}
