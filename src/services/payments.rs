use crate::{
    db::DbPool,
    entities::counterparty::Entity as CounterpartyEntity,
    entities::payment::{self, Entity as PaymentEntity, PaymentMethod, PaymentStatus},
    entities::wallet::{self, Entity as WalletEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    /// Signed amount: positive for income received, negative for an expense
    /// sent. The processor trusts the sign as given.
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub description: Option<String>,
    pub counterparty_id: Uuid,
    pub wallet_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub payment_date: DateTime<Utc>,
    pub amount: Decimal,
    pub method: String,
    pub status: String,
    pub description: Option<String>,
    pub counterparty_id: Uuid,
    pub wallet_id: Uuid,
}

/// Processor for payments.
///
/// The payment row and the wallet balance adjustment commit in one
/// transaction; neither is ever observable without the other.
#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl PaymentService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(wallet_id = %request.wallet_id, amount = %request.amount))]
    pub async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentResponse, ServiceError> {
        if request.amount == Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Payment amount must be non-zero".to_string(),
            ));
        }

        let now = Utc::now();
        let payment_id = Uuid::new_v4();

        let txn = self.db.begin().await?;

        CounterpartyEntity::find_by_id(request.counterparty_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Unknown counterparty {}",
                    request.counterparty_id
                ))
            })?;

        WalletEntity::find_by_id(request.wallet_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("Unknown wallet {}", request.wallet_id))
            })?;

        let model = payment::ActiveModel {
            id: Set(payment_id),
            payment_date: Set(now),
            amount: Set(request.amount),
            method: Set(request.method.to_string()),
            status: Set(request.status.to_string()),
            description: Set(request.description.clone()),
            counterparty_id: Set(request.counterparty_id),
            wallet_id: Set(request.wallet_id),
            created_at: Set(now),
        };
        let saved = model.insert(&txn).await?;

        // Single-statement balance adjustment; no in-memory read-modify-write.
        WalletEntity::update_many()
            .col_expr(
                wallet::Column::Balance,
                Expr::col(wallet::Column::Balance).add(request.amount),
            )
            .col_expr(wallet::Column::UpdatedAt, Expr::value(now))
            .filter(wallet::Column::Id.eq(request.wallet_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!(
            payment_id = %payment_id,
            wallet_id = %request.wallet_id,
            amount = %request.amount,
            "Payment recorded"
        );

        if let Some(sender) = &self.event_sender {
            let event = Event::PaymentRecorded {
                payment_id,
                wallet_id: request.wallet_id,
                amount: request.amount,
            };
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, payment_id = %payment_id, "Failed to send payment event");
            }
        }

        Ok(to_response(saved))
    }

    #[instrument(skip(self), fields(payment_id = %payment_id))]
    pub async fn get_payment(&self, payment_id: Uuid) -> Result<PaymentResponse, ServiceError> {
        let payment = PaymentEntity::find_by_id(payment_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Payment {} not found", payment_id)))?;
        Ok(to_response(payment))
    }

    #[instrument(skip(self), fields(wallet_id = %wallet_id))]
    pub async fn get_wallet(&self, wallet_id: Uuid) -> Result<wallet::Model, ServiceError> {
        WalletEntity::find_by_id(wallet_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Wallet {} not found", wallet_id)))
    }

    /// Payments recorded against a wallet, newest first.
    #[instrument(skip(self), fields(wallet_id = %wallet_id))]
    pub async fn list_for_wallet(
        &self,
        wallet_id: Uuid,
    ) -> Result<Vec<PaymentResponse>, ServiceError> {
        use sea_orm::QueryOrder;

        let payments = PaymentEntity::find()
            .filter(payment::Column::WalletId.eq(wallet_id))
            .order_by_desc(payment::Column::PaymentDate)
            .all(&*self.db)
            .await?;
        Ok(payments.into_iter().map(to_response).collect())
    }
}

fn to_response(model: payment::Model) -> PaymentResponse {
    PaymentResponse {
        id: model.id,
        payment_date: model.payment_date,
        amount: model.amount,
        method: model.method,
        status: model.status,
        description: model.description,
        counterparty_id: model.counterparty_id,
        wallet_id: model.wallet_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn response_preserves_signed_amount() {
        let now = Utc::now();
        let model = payment::Model {
            id: Uuid::new_v4(),
            payment_date: now,
            amount: dec!(-120.50),
            method: PaymentMethod::BankTransfer.to_string(),
            status: PaymentStatus::Completed.to_string(),
            description: Some("Office rent".to_string()),
            counterparty_id: Uuid::new_v4(),
            wallet_id: Uuid::new_v4(),
            created_at: now,
        };
        let response = to_response(model);
        assert_eq!(response.amount, dec!(-120.50));
        assert_eq!(response.method, "bank_transfer");
        assert_eq!(response.status, "completed");
    }
}
