use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// Contact email for a user. `None` when the user or the email is missing.
    async fn get_user_email_by_id(&self, user_id: Uuid) -> Result<Option<String>>;
}

#[derive(Clone)]
pub struct UsersRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl UserDirectory for UsersRepo {
    async fn get_user_email_by_id(&self, user_id: Uuid) -> Result<Option<String>> {
        let email: Option<Option<String>> =
            sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(email.flatten().filter(|e| !e.trim().is_empty()))
    }
}
