/// Skill Swap Server
///
/// Main server entry point. Handles:
/// - Command-line argument parsing
/// - Database initialization and admin bootstrap
/// - HTTP server startup
use actix_web::web;
use anyhow::{anyhow, Context};
use skill_swap_server::config::Config;
use skill_swap_server::services::AuthService;
use skill_swap_server::{db, server};
use std::fs;
use std::process;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let config = Config::from_args();

    log::info!("Starting Skill Swap Server");
    log::info!("Database: {:?}", config.database);
    log::info!("Port: {}", config.port);

    // Write PID file if specified
    if let Some(pidfile) = &config.pidfile {
        fs::write(pidfile, process::id().to_string())
            .with_context(|| format!("Failed to write PID file {:?}", pidfile))?;
        log::info!("PID file written to: {:?}", pidfile);
    }

    let db_path = config
        .database
        .to_str()
        .ok_or_else(|| anyhow!("Database path is not valid UTF-8: {:?}", config.database))?;
    let pool = db::create_pool(db_path).context("Failed to create database pool")?;
    log::info!("Database initialized");

    if let Some(admin) = config.admin_bootstrap() {
        let user = AuthService::ensure_admin(&pool, admin.email, admin.password, admin.name, admin.phone)
            .await
            .map_err(|e| anyhow!("Failed to bootstrap admin account: {:?}", e))?;
        log::info!("Admin account ready: {} (user {})", user.email, user.id);
    }

    let bind_addr = config.bind_addr();
    log::info!("Starting HTTP server on {}", bind_addr);

    let http_server = server::create_http_server(
        web::Data::new(pool),
        web::Data::new(config.auth_settings()),
        &bind_addr,
    )
    .with_context(|| format!("Failed to bind {}", bind_addr))?;
    http_server.await?;
    Ok(())
}
