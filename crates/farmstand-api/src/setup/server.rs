//! Server startup and graceful shutdown

use anyhow::Result;
use axum::Router;
use farmstand_core::Config;

/// Start the server with graceful shutdown
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.server_port()));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Listening");

    tracing::info!(
        products_file = %config.products_file().display(),
        upload_dir = %config.upload_dir().display(),
        upload_url_prefix = %config.upload_url_prefix(),
        max_image_bytes = config.max_image_size_bytes(),
        max_images_per_product = config.max_images_per_product(),
        image_extensions = %config.allowed_image_extensions().join(","),
        "Farmstand API ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM. In-flight requests finish before the
/// server returns.
///
/// # Panics
/// If a signal handler cannot be installed.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            panic!("cannot listen for Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => panic!("cannot listen for SIGTERM: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Shutdown requested, draining connections");
}
