use crate::{
    db::DbPool,
    entities::counterparty::{CounterpartyRole, Entity as CounterpartyEntity},
    entities::product::Entity as ProductEntity,
    entities::purchase_order::{self, Entity as PurchaseOrderEntity},
    entities::purchase_order_item::{self, Entity as PurchaseOrderItemEntity},
    entities::OrderStatus,
    errors::ServiceError,
    events::{Event, EventSender},
    services::numbering::{self, OrderKind},
    services::pricing::{self, LineAmount},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePurchaseOrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePurchaseOrderRequest {
    pub counterparty_id: Uuid,
    pub order_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "At least one line item is required"))]
    pub items: Vec<CreatePurchaseOrderItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseOrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseOrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub counterparty_id: Uuid,
    pub status: String,
    pub order_date: DateTime<Utc>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub items: Vec<PurchaseOrderItemResponse>,
    pub created_at: DateTime<Utc>,
}

/// Processor for purchase orders.
///
/// Creation persists the header and line items atomically but deliberately
/// leaves stock untouched: goods are not in hand until the separate receive
/// step confirms delivery.
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl PurchaseOrderService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(counterparty_id = %request.counterparty_id))]
    pub async fn create_purchase_order(
        &self,
        request: CreatePurchaseOrderRequest,
    ) -> Result<PurchaseOrderResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        for item in &request.items {
            if item.quantity < 1 {
                return Err(ServiceError::ValidationError(format!(
                    "Quantity for product {} must be at least 1",
                    item.product_id
                )));
            }
            if item.unit_price <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Unit price for product {} must be positive",
                    item.product_id
                )));
            }
        }

        let amounts: Vec<LineAmount> = request
            .items
            .iter()
            .map(|item| LineAmount {
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();
        let totals = pricing::compute_order_totals(&amounts, pricing::PURCHASE_TAX_RATE);

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let order_number = numbering::generate_order_number(OrderKind::Purchase);

        let txn = self.db.begin().await?;

        let counterparty = CounterpartyEntity::find_by_id(request.counterparty_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Unknown counterparty {}",
                    request.counterparty_id
                ))
            })?;
        if !counterparty.has_role(CounterpartyRole::Vendor) {
            return Err(ServiceError::ValidationError(format!(
                "Counterparty {} is not a vendor",
                counterparty.name
            )));
        }

        let header = purchase_order::ActiveModel {
            id: Set(order_id),
            order_number: Set(order_number.clone()),
            counterparty_id: Set(request.counterparty_id),
            status: Set(OrderStatus::Pending.to_string()),
            order_date: Set(request.order_date),
            subtotal: Set(totals.subtotal),
            tax: Set(totals.tax),
            total: Set(totals.total),
            created_at: Set(now),
            updated_at: Set(None),
        };
        let header = header
            .insert(&txn)
            .await
            .map_err(ServiceError::from_write_err)?;

        let mut item_models = Vec::with_capacity(request.items.len());
        for item in &request.items {
            // Line items must reference a real product even though stock is
            // not mutated here.
            ProductEntity::find_by_id(item.product_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::ValidationError(format!("Unknown product {}", item.product_id))
                })?;

            let saved = purchase_order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                purchase_order_id: Set(order_id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
            item_models.push(saved);
        }

        txn.commit().await?;

        info!(
            order_id = %order_id,
            order_number = %order_number,
            total = %totals.total,
            "Purchase order created"
        );

        if let Some(sender) = &self.event_sender {
            let event = Event::PurchaseOrderCreated {
                order_id,
                order_number: order_number.clone(),
            };
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, order_id = %order_id, "Failed to send purchase order event");
            }
        }

        Ok(to_response(header, item_models))
    }

    /// Retrieves a purchase order with its line items.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_purchase_order(
        &self,
        order_id: Uuid,
    ) -> Result<PurchaseOrderResponse, ServiceError> {
        let db = &*self.db;

        let header = PurchaseOrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order {} not found", order_id))
            })?;

        let items = PurchaseOrderItemEntity::find()
            .filter(purchase_order_item::Column::PurchaseOrderId.eq(order_id))
            .all(db)
            .await?;

        Ok(to_response(header, items))
    }
}

fn to_response(
    header: purchase_order::Model,
    items: Vec<purchase_order_item::Model>,
) -> PurchaseOrderResponse {
    PurchaseOrderResponse {
        id: header.id,
        order_number: header.order_number,
        counterparty_id: header.counterparty_id,
        status: header.status,
        order_date: header.order_date,
        subtotal: header.subtotal,
        tax: header.tax,
        total: header.total,
        items: items
            .into_iter()
            .map(|item| PurchaseOrderItemResponse {
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect(),
        created_at: header.created_at,
    }
}
