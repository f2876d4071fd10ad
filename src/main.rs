// src/main.rs
use actix_web::{
    middleware::{Compress, DefaultHeaders, Logger},
    web, App, HttpServer, Result,
};
use actix_web::http::header;
use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use anyhow::Context;
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod derivation;
mod error;
mod handlers;
mod import_export;
mod models;
mod session;
mod storage;
mod store;
pub mod validator;

use config::{load_config, Config, StorageBackend};
use session::ShellSession;
use storage::{FileKeyValueStore, InventoryGateway, KeyValueStore, MemoryKeyValueStore, StorageKey};
use store::ItemStore;

/// Shared state. The store mutex makes the shell the single writer.
pub struct AppState {
    pub store: Mutex<ItemStore>,
    pub session: Mutex<ShellSession>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: ItemStore, config: Config) -> Self {
        Self {
            store: Mutex::new(store),
            session: Mutex::new(ShellSession::new()),
            config,
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    setup_logging(&config)?;
    config.print_startup_info();

    let gateway = setup_storage(&config)?;
    let store = ItemStore::load(gateway).with_persist_empty(config.storage.persist_empty);
    log::info!("Inventory ready with {} items", store.len());

    let app_state = Arc::new(AppState::new(store, config.clone()));

    let bind_address = config.bind_address();
    log::info!("Starting server at http://{}", bind_address);

    let server_config = config.clone();
    let mut server = HttpServer::new(move || {
        let cors = setup_improved_cors(&server_config.security.allowed_origins);

        let app = App::new()
            .wrap(cors)
            .wrap(setup_security_headers())
            .wrap(Logger::default())
            .wrap(Compress::default())
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().limit(1024 * 1024))
            .configure(handlers::configure);

        match &server_config.frontend.static_dir {
            Some(dir) => app
                .route("/", web::get().to(serve_index))
                .service(Files::new("/", dir).index_file("index.html")),
            None => app,
        }
    });

    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await
        .context("Server error")?;

    Ok(())
}

fn setup_storage(config: &Config) -> anyhow::Result<InventoryGateway> {
    let key = StorageKey::new(config.storage.key.clone())
        .context("Invalid storage key")?;

    let kv: Box<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::File => {
            std::fs::create_dir_all(&config.storage.data_dir)
                .with_context(|| format!("Failed to create data directory: {}", config.storage.data_dir))?;
            Box::new(FileKeyValueStore::new(&config.storage.data_dir))
        }
        StorageBackend::Memory => Box::new(MemoryKeyValueStore::new()),
    };

    let gateway = InventoryGateway::new(kv, key);
    log::info!("Storage backend: {}", gateway.describe());
    Ok(gateway)
}

fn setup_logging(config: &Config) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let level = config.logging.level.as_str();
            tracing_subscriber::EnvFilter::new(level)
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

fn is_production() -> bool {
    env::var("STOCKFLOW_ENV").as_deref() == Ok("production")
}

pub fn setup_improved_cors(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::USER_AGENT,
            header::REFERER,
        ])
        .expose_headers(vec![header::CONTENT_LENGTH, header::CONTENT_DISPOSITION])
        .max_age(3600);

    if allowed_origins.iter().any(|origin| origin == "*") {
        if is_production() {
            log::warn!("⚠️  Wildcard CORS origin ignored in production; set ALLOWED_ORIGINS explicitly");
        } else {
            log::warn!("⚠️  Using wildcard CORS (*) in development mode");
            return cors.allow_any_origin();
        }
    }

    for origin in allowed_origins {
        if origin.is_empty() || origin == "*" {
            continue;
        }
        log::debug!("Adding CORS origin: {}", origin);
        cors = cors.allowed_origin(origin);
    }

    cors
}

fn setup_security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
}

async fn serve_index(app_state: web::Data<Arc<AppState>>) -> Result<NamedFile> {
    let dir = app_state.config.frontend.static_dir.clone().unwrap_or_default();
    let path = PathBuf::from(dir).join("index.html");
    Ok(NamedFile::open(path)?)
}
