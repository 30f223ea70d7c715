//! HTTP front end for a pictdb database.
//!
//! Serves a single pre-opened database over four endpoints —
//! `/pictDB/{list,read,insert,delete}` — and static assets for every other
//! path. Engine access is serialised through one mutex-guarded handle that
//! is passed into handlers via router state.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::missing_docs_in_private_items
)]

mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::routing::{get, post};
use clap::Parser;
use pictdb::PictDb;
use pictdb_image::JpegCodec;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "pictdb-server",
    version,
    about = "HTTP front end for a pictdb database"
)]
struct Cli {
    /// Database file served by this instance.
    db: PathBuf,

    /// TCP port to listen on.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Directory of static assets served for non-API paths.
    #[arg(long, default_value = "web")]
    assets: PathBuf,
}

/// Shared state handed to every request handler.
#[derive(Clone)]
pub(crate) struct AppState {
    /// The single database handle, serialised behind a mutex.
    pub(crate) db: Arc<Mutex<PictDb>>,
    /// JPEG codec used by read and insert.
    pub(crate) codec: JpegCodec,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let db = PictDb::open(&cli.db, "r+b")?;
    print!("{}", db.header());

    let state = AppState {
        db: Arc::new(Mutex::new(db)),
        codec: JpegCodec,
    };

    let app = Router::new()
        .route("/pictDB/list", get(routes::list))
        .route("/pictDB/read", get(routes::read))
        .route("/pictDB/insert", post(routes::insert))
        .route("/pictDB/delete", post(routes::delete))
        .fallback_service(ServeDir::new(&cli.assets))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cli.port)).await?;
    info!(port = cli.port, db = %cli.db.display(), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    Ok(())
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
