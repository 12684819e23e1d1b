#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, clippy::must_use_candidate, missing_debug_implementations, unreachable_pub, dead_code)]
use messenger_server::api::{MgmtState, app_router, mgmt_router};
use messenger_server::config::Config;
use messenger_server::services::health_service::HealthService;
use messenger_server::storage::{InMemoryMessageStore, MessageStore, seed};
use messenger_server::App;
use serde_json::{Value, json};
use std::sync::{Arc, Once};
use tokio::net::TcpListener;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("messenger_server=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().init();
    });
}

pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
    pub store: Arc<InMemoryMessageStore>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_store(Arc::new(InMemoryMessageStore::new())).await
    }

    /// Spawns an app preloaded with the ten demo messages.
    pub async fn spawn_seeded() -> Self {
        let store = Arc::new(InMemoryMessageStore::new());
        seed::seed_demo_messages(store.as_ref()).await.unwrap();
        Self::spawn_with_store(store).await
    }

    pub async fn spawn_with_store(store: Arc<InMemoryMessageStore>) -> Self {
        setup_tracing();
        let config = Config::default();
        let app = App::new(&config, Arc::clone(&store) as Arc<dyn MessageStore>);

        let api_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_url = format!("http://{}", api_listener.local_addr().unwrap());
        let mgmt_url = format!("http://{}", mgmt_listener.local_addr().unwrap());

        let api = app_router(app.message_service);
        let mgmt = mgmt_router(MgmtState { health_service: app.health_service });
        tokio::spawn(async move { axum::serve(api_listener, api).await.unwrap() });
        tokio::spawn(async move { axum::serve(mgmt_listener, mgmt).await.unwrap() });

        Self { server_url, mgmt_url, client: reqwest::Client::new(), store }
    }

    /// Spawns only the management router over an arbitrary store and returns its base URL.
    pub async fn spawn_mgmt(store: Arc<dyn MessageStore>) -> String {
        setup_tracing();
        let health_service = HealthService::new(store, Config::default().health);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_url = format!("http://{}", listener.local_addr().unwrap());
        let mgmt = mgmt_router(MgmtState { health_service });
        tokio::spawn(async move { axum::serve(listener, mgmt).await.unwrap() });

        mgmt_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{}", self.server_url, path)
    }

    pub async fn send(&self, content: &str, recipient: &str, sender: &str) -> reqwest::Response {
        self.client
            .post(self.url("/messages"))
            .json(&json!({ "content": content, "recipientAddress": recipient, "senderAddress": sender }))
            .send()
            .await
            .unwrap()
    }

    /// Sends a message that must be accepted and returns its JSON body.
    pub async fn send_ok(&self, content: &str, recipient: &str, sender: &str) -> Value {
        let resp = self.send(content, recipient, sender).await;
        assert_eq!(resp.status(), 201, "send failed");
        resp.json().await.unwrap()
    }

    pub async fn get_json(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status();
        let body = resp.json().await.unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn list(&self, path: &str) -> Vec<Value> {
        let (status, body) = self.get_json(path).await;
        assert_eq!(status, 200, "GET {path} failed");
        body.as_array().unwrap().clone()
    }
}

pub fn ids(messages: &[Value]) -> Vec<String> {
    messages.iter().map(|m| m["id"].as_str().unwrap().to_string()).collect()
}
