use crate::domain::payment::{IntentMetadata, LineItem, PaymentIntent, ReturnUrls};
use crate::gateways::{GatewayError, PaymentGateway};
use crate::repo::courses_repo::CourseCatalog;
use crate::repo::users_repo::UserDirectory;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PurchaseIntentError {
    #[error("Course with ID {0} not found.")]
    CourseNotFound(Uuid),

    #[error("Course price is invalid. Payment cannot proceed.")]
    CourseUnavailable(Uuid),

    #[error("Email not found for user ID {0}.")]
    PurchaserContactUnresolved(Uuid),

    #[error("Failed to create payment preference: {0}")]
    Gateway(#[from] GatewayError),

    #[error("lookup failed: {0}")]
    Lookup(anyhow::Error),
}

impl PurchaseIntentError {
    pub fn code(&self) -> &'static str {
        match self {
            PurchaseIntentError::CourseNotFound(_) => "COURSE_NOT_FOUND",
            PurchaseIntentError::CourseUnavailable(_) => "COURSE_UNAVAILABLE",
            PurchaseIntentError::PurchaserContactUnresolved(_) => "PURCHASER_CONTACT_UNRESOLVED",
            PurchaseIntentError::Gateway(_) => "GATEWAY_ERROR",
            PurchaseIntentError::Lookup(_) => "INTERNAL_ERROR",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            PurchaseIntentError::CourseUnavailable(_) => Some(serde_json::json!(
                "Course price must be a positive number."
            )),
            PurchaseIntentError::Gateway(e) => Some(e.diagnostic()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseIntent {
    pub preference_id: String,
    pub redirect_url: String,
}

#[derive(Clone)]
pub struct PreferenceBuilder {
    pub courses: Arc<dyn CourseCatalog>,
    pub users: Arc<dyn UserDirectory>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub app_url: String,
    pub currency: String,
}

impl PreferenceBuilder {
    pub async fn create_purchase_intent(
        &self,
        course_id: Uuid,
        purchaser_id: Uuid,
    ) -> Result<PurchaseIntent, PurchaseIntentError> {
        let course = self
            .courses
            .fetch_course_by_id(course_id)
            .await
            .map_err(PurchaseIntentError::Lookup)?
            .ok_or(PurchaseIntentError::CourseNotFound(course_id))?;

        let Some(price) = course.sale_price() else {
            tracing::warn!(%course_id, price = ?course.price, "course has no sellable price");
            return Err(PurchaseIntentError::CourseUnavailable(course_id));
        };

        let payer_email = self
            .users
            .get_user_email_by_id(purchaser_id)
            .await
            .map_err(PurchaseIntentError::Lookup)?
            .ok_or(PurchaseIntentError::PurchaserContactUnresolved(purchaser_id))?;

        let intent = self.build_intent(course_id, purchaser_id, &course.title, price, payer_email);

        let created = self
            .gateway
            .create_payment_intent(&intent)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    %course_id,
                    %purchaser_id,
                    gateway = self.gateway.name(),
                    error = %e,
                    diagnostic = %e.diagnostic(),
                    "payment preference creation failed"
                )
            })?;

        tracing::info!(
            %course_id,
            %purchaser_id,
            preference_id = %created.id,
            "payment preference created"
        );

        Ok(PurchaseIntent {
            preference_id: created.id,
            redirect_url: created.redirect_url,
        })
    }

    fn build_intent(
        &self,
        course_id: Uuid,
        purchaser_id: Uuid,
        title: &str,
        price: rust_decimal::Decimal,
        payer_email: String,
    ) -> PaymentIntent {
        let course = course_id.to_string();
        let course_url = format!("{}/courses/{}", self.app_url, course);

        PaymentIntent {
            course_id: course.clone(),
            purchaser_id: purchaser_id.to_string(),
            payer_email,
            amount: price,
            currency: self.currency.clone(),
            items: vec![LineItem {
                id: course.clone(),
                title: title.to_string(),
                quantity: 1,
                unit_price: price,
                currency_id: self.currency.clone(),
            }],
            return_urls: ReturnUrls {
                success: format!("{course_url}/access?status=success"),
                failure: format!("{course_url}?status=failure"),
                pending: format!("{course_url}?status=pending"),
            },
            notification_url: format!("{}/api/payment/webhook?source_news=webhooks", self.app_url),
            metadata: IntentMetadata {
                purchaser_id: purchaser_id.to_string(),
                course_id: course,
            },
        }
    }
}
