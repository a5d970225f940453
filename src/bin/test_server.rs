// Standalone discover fixture server for local runs:
//   cargo run --features test-server --bin test-server -- 3000
//   discover-e2e run --base-url http://127.0.0.1:3000

use std::net::SocketAddr;
use tracing::{Level, info};

include!("../../tests/test_server_app.rs");

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let app = create_app().await;

    let port: u16 = std::env::args()
        .nth(1)
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");

    info!(
        "Discover fixture listening on http://{} ({} catalog entries)",
        addr,
        catalog().len()
    );

    axum::serve(listener, app).await.expect("Server failed");
}
