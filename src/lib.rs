pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::database::Database;
use crate::services::{
    auth_service::AuthService, diligence_service::DiligenceService,
    profile_service::ProfileService, user_service::UserService,
};
use crate::utils::token::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub tokens: TokenService,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub profile_service: ProfileService,
    pub diligence_service: DiligenceService,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        let tokens = TokenService::new(
            &config.jwt_secret,
            chrono::Duration::hours(config.token_ttl_hours),
        );
        let user_service = UserService::new(db.clone());
        let auth_service = AuthService::new(user_service.clone(), tokens.clone());
        let profile_service = ProfileService::new(db.clone());
        let diligence_service = DiligenceService::new(db.clone());

        Self {
            db,
            config: Arc::new(config),
            tokens,
            auth_service,
            user_service,
            profile_service,
            diligence_service,
        }
    }
}
