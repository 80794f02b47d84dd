//! PRINCIPLE storefront service
//!
//! Merchandise storefront with retail and wholesale pricing.
//!
//! ## Features
//! - Pricing and eligibility rules (tier, stock, minimum order quantity)
//! - Per-session role/badge switcher and cart
//! - Static product catalog and location API
//! - Store, product, cart and checkout views
//! - Simulated order placement

pub mod api;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod media;
pub mod pricing;
pub mod storefront;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::storefront::SessionStore;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

// =============================================================================
// Server
// =============================================================================

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Binds `HOST:PORT` and serves until the process is stopped.
pub async fn serve(config: Config) -> Result<()> {
    let address = config.bind_address();
    let max_idle = config.session_idle();
    let state = api::AppState::new(config);
    let sweeper = max_idle.map(|max_idle| tokio::spawn(sweep_sessions(Arc::clone(&state.sessions), max_idle)));

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("PRINCIPLE storefront listening on {}", address);
    let served = axum::serve(listener, app).await;
    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    served?;
    Ok(())
}

async fn sweep_sessions(sessions: Arc<SessionStore>, max_idle: chrono::Duration) {
    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        ticker.tick().await;
        sessions.sweep_idle(chrono::Utc::now(), max_idle).await;
    }
}
