// src/main.rs
use anyhow::{Context, Result};
use chatkit_embed::{
    config::{self, MetricsConfig, ServerConfig},
    health::ReqwestTransport,
    metrics::MetricsRegistry,
    options::{FileOptionsStore, OptionsResolver},
    server::{RequestHandler, ServerBuilder},
    App,
};
use clap::{Parser, Subcommand};
use hyper::{Body, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "chatkit-embed")]
#[command(about = "ChatKit embed service with worker health relay", long_about = None)]
struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Install default options if needed and serve HTTP (default)
    Serve,
    /// Install default options without overwriting existing ones
    Activate,
    /// Delete stored options
    Uninstall,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chatkit_embed=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    info!("Loading configuration from: {}", cli.config.display());
    let config = config::load_config(&cli.config).await?;

    let store = Arc::new(
        FileOptionsStore::open(&config.options_path)
            .await
            .context("Failed to open options store")?,
    );
    let resolver = OptionsResolver::new(store.clone());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Activate => {
            resolver.activate().await?;
            Ok(())
        }
        Commands::Uninstall => {
            resolver.uninstall().await?;
            Ok(())
        }
        Commands::Serve => {
            // First start behaves like plugin activation.
            resolver.activate().await?;
            serve(config, store).await
        }
    }
}

async fn serve(config: ServerConfig, store: Arc<FileOptionsStore>) -> Result<()> {
    // Initialize metrics
    let metrics_registry = MetricsRegistry::new()?;
    let metrics = metrics_registry.collector();

    let transport = Arc::new(
        ReqwestTransport::new(config.health.timeout()).context("Failed to create HTTP client")?,
    );

    let app = Arc::new(App::new(&config, store, transport, Some(metrics)));

    if config.metrics.enabled {
        start_metrics_server(&config.metrics, metrics_registry).await?;
    }

    info!("Starting ChatKit embed service on {}", config.listen_addr);
    ServerBuilder::new(config.listen_addr)
        .with_handler(RequestHandler::new(app))
        .serve_until(shutdown_signal())
        .await
}

async fn start_metrics_server(config: &MetricsConfig, registry: MetricsRegistry) -> Result<()> {
    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let registry = Arc::new(registry);
    let metrics_path = Arc::new(config.path.clone());
    let service_path = metrics_path.clone();

    let make_service = hyper::service::make_service_fn(move |_| {
        let registry = registry.clone();
        let path = service_path.clone();

        async move {
            Ok::<_, Infallible>(hyper::service::service_fn(move |req: Request<Body>| {
                let registry = registry.clone();
                let path = path.clone();

                async move {
                    let response = if req.uri().path() != path.as_str() {
                        plain(StatusCode::NOT_FOUND, Body::from("Not Found"))
                    } else {
                        match registry.gather() {
                            Ok(metrics) => {
                                let mut response = plain(StatusCode::OK, Body::from(metrics));
                                response.headers_mut().insert(
                                    hyper::header::CONTENT_TYPE,
                                    hyper::header::HeaderValue::from_static(
                                        "text/plain; version=0.0.4",
                                    ),
                                );
                                response
                            }
                            Err(e) => {
                                error!("Failed to encode metrics: {}", e);
                                plain(StatusCode::INTERNAL_SERVER_ERROR, Body::empty())
                            }
                        }
                    };
                    Ok::<_, Infallible>(response)
                }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind metrics server on {}", addr))?
        .serve(make_service);

    info!(
        "Metrics server listening on http://{}{}",
        addr,
        metrics_path.as_str()
    );

    tokio::spawn(async move {
        if let Err(e) = server.await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(())
}

fn plain(status: StatusCode, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn no_arguments_serves_with_default_config() {
        let cli = Cli::try_parse_from(["chatkit-embed"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
    }

    #[test]
    fn subcommand_takes_config_flag() {
        let cli =
            Cli::try_parse_from(["chatkit-embed", "uninstall", "--config", "prod.yaml"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Uninstall));
        assert_eq!(cli.config, PathBuf::from("prod.yaml"));

        let cli = Cli::try_parse_from(["chatkit-embed", "-c", "a.json", "activate"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Activate));
        assert_eq!(cli.config, PathBuf::from("a.json"));
    }

    #[test]
    fn mistyped_subcommand_is_rejected() {
        let err = Cli::try_parse_from(["chatkit-embed", "uninstal"]).unwrap_err();
        assert_ne!(err.kind(), ErrorKind::DisplayHelp);
        assert!(err.use_stderr());
    }

    #[test]
    fn help_is_not_an_error() {
        let err = Cli::try_parse_from(["chatkit-embed", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(!err.use_stderr());
    }
}
