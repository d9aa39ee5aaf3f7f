use anyhow::Result;
use axum::Router;
use clap::{Parser, ValueEnum};
use gutensearch_core::StoreKind;
use gutensearch_server::{app_state, build_app};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "gutensearch-server")]
#[command(about = "Serve boolean search over a persisted inverted index", long_about = None)]
struct Args {
    /// Root containing persisted index artifacts
    #[arg(long, default_value = "datamarts")]
    datamarts: PathBuf,
    /// Persistence backend to read from
    #[arg(long, value_enum, default_value = "monolith")]
    store: StoreArg,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[derive(Clone, Copy, ValueEnum)]
enum StoreArg {
    Monolith,
    Partitioned,
    Docstore,
}

impl From<StoreArg> for StoreKind {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Monolith => StoreKind::Monolith,
            StoreArg::Partitioned => StoreKind::Partitioned,
            StoreArg::Docstore => StoreKind::DocStore,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let state = app_state(&args.datamarts, args.store.into())?;
    let app: Router = build_app(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
