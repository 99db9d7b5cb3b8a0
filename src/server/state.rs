use std::sync::Arc;
use std::time::Instant;

use crate::auth::JwtValidator;
use crate::config::Settings;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn Store>,
    /// `None` when no secret is configured
    pub jwt_validator: Option<Arc<JwtValidator>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn Store>) -> Self {
        let jwt_validator = JwtValidator::from_config(&settings.jwt).map(Arc::new);

        if jwt_validator.is_none() {
            tracing::warn!("jwt.secret is not set, API authentication is disabled");
        }

        Self {
            settings: Arc::new(settings),
            store,
            jwt_validator,
            start_time: Instant::now(),
        }
    }
}
