use std::env;

use anyhow::{Context, Result};
use policy_api::{build_app, DEFAULT_BIND};
use policy_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("policy_desk_api");

    let bind = env::var("POLICY_DESK_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());

    let app = build_app()?;

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(bind = %bind, "policy desk api started");

    println!("\n  Policy Tool running at http://{bind}");
    println!("  Open that URL in your browser");
    println!("  Ctrl+C to stop\n");

    axum::serve(listener, app).await?;
    Ok(())
}
