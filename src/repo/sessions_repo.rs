use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Option<Uuid>>;
}

#[derive(Clone)]
pub struct SessionsRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl SessionResolver for SessionsRepo {
    async fn resolve(&self, token: &str) -> Result<Option<Uuid>> {
        let user_id = sqlx::query_scalar(
            "SELECT user_id FROM sessions WHERE token = $1 AND expires_at > now()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id)
    }
}
