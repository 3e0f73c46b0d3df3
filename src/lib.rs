pub mod config;
pub mod domain {
    pub mod course;
    pub mod payment;
    pub mod purchase;
}
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod access;
        pub mod ops;
        pub mod payments;
        pub mod webhooks;
    }
    pub mod middleware {
        pub mod rate_limit;
        pub mod session_auth;
        pub mod webhook_origin;
    }
    pub mod routes;
}
pub mod repo {
    pub mod courses_repo;
    pub mod purchases_repo;
    pub mod sessions_repo;
    pub mod users_repo;
}
pub mod service {
    pub mod preference_builder;
    pub mod reconciler;
    pub mod webhook_auth;
}

use repo::purchases_repo::PurchaseLedger;
use repo::sessions_repo::SessionResolver;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub preference_builder: service::preference_builder::PreferenceBuilder,
    pub reconciler: service::reconciler::WebhookReconciler,
    pub webhook_authenticator: service::webhook_auth::WebhookAuthenticator,
    pub ledger: Arc<dyn PurchaseLedger>,
    pub sessions: Arc<dyn SessionResolver>,
    pub pool: sqlx::PgPool,
    pub redis_client: redis::Client,
}
