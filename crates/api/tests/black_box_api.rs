use std::sync::Arc;

use async_trait::async_trait;

use batchline_api::app::{self, services};
use batchline_core::{LOYALTY_OFF, LoyaltyRecord, ProductRecord};
use batchline_pipeline::{InMemoryProductStore, ProductStore, StoreError};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(store: Arc<dyn ProductStore>) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = app::build_router(Arc::new(services::build_with_store(store)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn product(id: i64, sku: i64) -> ProductRecord {
    ProductRecord {
        id,
        sku,
        name: format!("product-{id}"),
        amount: 1,
        payload: "raw".to_string(),
    }
}

#[tokio::test]
async fn status_endpoint_returns_the_liveness_string() {
    let srv = TestServer::spawn(Arc::new(InMemoryProductStore::new())).await;

    let body = reqwest::get(format!("{}/api/status", srv.base_url))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert_eq!(body, "Batch processing service is running");
}

#[tokio::test]
async fn health_endpoint_is_bare_ok() {
    let srv = TestServer::spawn(Arc::new(InMemoryProductStore::new())).await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert!(res.status().is_success());
    assert_eq!(res.text().await.unwrap(), "");
}

#[tokio::test]
async fn run_batch_enriches_writes_and_reports_success() {
    let store = Arc::new(InMemoryProductStore::with_products(vec![
        product(1, 1),
        product(2, 2),
        product(3, 1),
        product(4, 3),
    ]));
    store.insert_loyalty(1, "Gold");
    store.insert_loyalty(3, "Silver");

    let srv = TestServer::spawn(store.clone()).await;
    let client = reqwest::Client::new();

    let body = client
        .post(format!("{}/api/run-batch", srv.base_url))
        .header("X-Trace-Id", "abc123")
        .header("X-Span-Id", "span-1")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert_eq!(body, "Batch job completed successfully");

    let written = store.written();
    let payloads: Vec<&str> = written.iter().map(|r| r.payload.as_str()).collect();
    assert_eq!(payloads, vec!["Gold", LOYALTY_OFF, "Gold", "Silver"]);

    // sku 1 and sku 3 were each looked up once; the absent sku 2 once.
    assert_eq!(store.lookup_calls_for(1), 1);
    assert_eq!(store.lookup_calls_for(2), 1);
    assert_eq!(store.lookup_calls_for(3), 1);

    let metrics: serde_json::Value = client
        .get(format!("{}/api/metrics", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(metrics["processed_items_total"], 4);
    assert_eq!(metrics["enrichment_updated_total"], 3);
    assert_eq!(metrics["failed_items_total"], 0);
    assert_eq!(metrics["job_execution_duration_count"], 1);
}

#[tokio::test]
async fn each_trigger_is_an_independent_run_with_its_own_cache() {
    let store = Arc::new(InMemoryProductStore::with_products(vec![
        product(1, 7),
        product(2, 7),
    ]));
    store.insert_loyalty(7, "Gold");

    let srv = TestServer::spawn(store.clone()).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let body = client
            .post(format!("{}/api/run-batch", srv.base_url))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "Batch job completed successfully");
    }

    // The cache does not survive a run: one lookup per run.
    assert_eq!(store.lookup_calls_for(7), 2);
}

struct BrokenStore;

#[async_trait]
impl ProductStore for BrokenStore {
    async fn read_batch(&self, _limit: u32) -> Result<Vec<ProductRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn fetch_loyalty(&self, _sku: i64) -> Result<Option<LoyaltyRecord>, StoreError> {
        Ok(None)
    }

    async fn write_enriched(&self, _records: &[ProductRecord]) -> Result<(), StoreError> {
        Ok(())
    }

    async fn recent(&self, _limit: u32) -> Result<Vec<ProductRecord>, StoreError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn failures_are_rendered_as_plain_text() {
    let srv = TestServer::spawn(Arc::new(BrokenStore)).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/run-batch", srv.base_url))
        .send()
        .await
        .unwrap();

    assert!(res.status().is_success());
    let body = res.text().await.unwrap();
    assert!(body.starts_with("Error: batch read failed"), "body was: {body}");
}
