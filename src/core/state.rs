//! Shared application state

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::orders::OrderEngine;
use crate::services::{AiService, Mailer};
use crate::utils::AppResult;

/// State shared across all request handlers
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub ai: AiService,
    pub mailer: Mailer,
}

impl ServerState {
    /// Open the database, run migrations and wire up services
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let db = DbService::new(&config.database_path).await?;
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let ai = AiService::new(config.gemini_api_key.clone());
        let mailer = Mailer::new(config.frontend_url.clone());

        Ok(Self {
            config: Arc::new(config),
            pool: db.pool,
            jwt_service,
            ai,
            mailer,
        })
    }

    /// Order engine bound to this state's pool
    pub fn engine(&self) -> OrderEngine {
        OrderEngine::new(self.pool.clone())
    }
}
