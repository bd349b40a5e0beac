use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    batchline_observability::init();

    let app = batchline_api::app::build_app().await;

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        "listening on {}, POST /api/run-batch to execute a run",
        listener.local_addr()?
    );

    axum::serve(listener, app).await.context("server exited")?;

    Ok(())
}
