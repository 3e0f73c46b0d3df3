use course_payments::config::{AppConfig, GatewayAdapter};
use course_payments::gateways::mercadopago::MercadoPagoGateway;
use course_payments::gateways::mock::MockGateway;
use course_payments::gateways::PaymentGateway;
use course_payments::http::middleware::rate_limit::RateLimitState;
use course_payments::http::routes::build_router;
use course_payments::repo::courses_repo::CoursesRepo;
use course_payments::repo::purchases_repo::{PurchaseLedger, PurchasesRepo};
use course_payments::repo::sessions_repo::SessionsRepo;
use course_payments::repo::users_repo::UsersRepo;
use course_payments::service::preference_builder::PreferenceBuilder;
use course_payments::service::reconciler::WebhookReconciler;
use course_payments::service::webhook_auth::WebhookAuthenticator;
use course_payments::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let gateway: Arc<dyn PaymentGateway> = match cfg.gateway_adapter {
        GatewayAdapter::MercadoPago => {
            if cfg.has_placeholder_access_token() {
                tracing::warn!(
                    "MERCADO_PAGO_ACCESS_TOKEN is not set or is a placeholder; real payments will not work"
                );
            }
            Arc::new(MercadoPagoGateway {
                base_url: cfg.mercadopago_base_url.clone(),
                access_token: cfg.mercadopago_access_token.clone(),
                timeout_ms: cfg.gateway_timeout_ms,
                use_sandbox_init_point: cfg.use_sandbox_init_point,
                client: reqwest::Client::new(),
            })
        }
        GatewayAdapter::Mock => {
            tracing::warn!("using in-process mock payment gateway");
            Arc::new(MockGateway::new(&format!("{}/mock-checkout", cfg.app_url)))
        }
    };

    let ledger: Arc<dyn PurchaseLedger> = Arc::new(PurchasesRepo { pool: pool.clone() });
    let redis_client = redis::Client::open(cfg.redis_url.clone())?;

    let state = AppState {
        preference_builder: PreferenceBuilder {
            courses: Arc::new(CoursesRepo { pool: pool.clone() }),
            users: Arc::new(UsersRepo { pool: pool.clone() }),
            gateway: gateway.clone(),
            app_url: cfg.app_url.clone(),
            currency: cfg.currency.clone(),
        },
        reconciler: WebhookReconciler {
            gateway,
            ledger: ledger.clone(),
        },
        webhook_authenticator: WebhookAuthenticator::new(&cfg.webhook_user_agent_marker),
        ledger,
        sessions: Arc::new(SessionsRepo { pool: pool.clone() }),
        pool,
        redis_client: redis_client.clone(),
    };

    let app = build_router(
        state,
        Some(RateLimitState {
            redis_client,
            max_per_minute: cfg.intent_rate_limit_per_minute,
        }),
    );

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
