use crate::{
    db::DbPool,
    entities::counterparty::{CounterpartyRole, Entity as CounterpartyEntity},
    entities::product::{self, Entity as ProductEntity},
    entities::sales_order::{self, Entity as SalesOrderEntity},
    entities::sales_order_item::{self, Entity as SalesOrderItemEntity},
    entities::OrderStatus,
    errors::ServiceError,
    events::{Event, EventSender},
    services::invoicing,
    services::numbering::{self, OrderKind},
    services::pricing::{self, LineAmount},
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
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSalesOrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSalesOrderRequest {
    pub counterparty_id: Uuid,
    pub order_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "At least one line item is required"))]
    pub items: Vec<CreateSalesOrderItem>,
    #[serde(default)]
    pub generate_invoice: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SalesOrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SalesOrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub counterparty_id: Uuid,
    pub status: String,
    pub order_date: DateTime<Utc>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub items: Vec<SalesOrderItemResponse>,
    pub invoice_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Processor for sales orders.
///
/// Creation runs as a single database transaction: header, line items, stock
/// decrements and the optional invoice all persist together or not at all.
#[derive(Clone)]
pub struct SalesOrderService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl SalesOrderService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// Creates a sales order, decrementing stock per line item and optionally
    /// emitting a draft invoice, atomically.
    ///
    /// The stock check and decrement are one guarded UPDATE executed inside
    /// the transaction, so two concurrent sales cannot both pass a check that
    /// should fail one of them.
    #[instrument(skip(self, request), fields(counterparty_id = %request.counterparty_id))]
    pub async fn create_sales_order(
        &self,
        request: CreateSalesOrderRequest,
    ) -> Result<SalesOrderResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        validate_line_items(&request.items)?;

        let amounts: Vec<LineAmount> = request
            .items
            .iter()
            .map(|item| LineAmount {
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();
        let totals = pricing::compute_order_totals(&amounts, pricing::SALES_TAX_RATE);

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let order_number = numbering::generate_order_number(OrderKind::Sales);

        let txn = self.db.begin().await?;

        // Role gate is re-checked here; the form layer's validation is UX
        // sugar, not the authoritative gate.
        let counterparty = CounterpartyEntity::find_by_id(request.counterparty_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Unknown counterparty {}",
                    request.counterparty_id
                ))
            })?;
        if !counterparty.has_role(CounterpartyRole::Client) {
            return Err(ServiceError::ValidationError(format!(
                "Counterparty {} is not a client",
                counterparty.name
            )));
        }

        let header = sales_order::ActiveModel {
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
            let saved = sales_order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                sales_order_id: Set(order_id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
            item_models.push(saved);

            self.decrement_stock(&txn, item.product_id, item.quantity)
                .await?;
        }

        let invoice = if request.generate_invoice {
            Some(invoicing::issue_for_order(&txn, &header, now).await?)
        } else {
            None
        };

        txn.commit().await?;

        info!(
            order_id = %order_id,
            order_number = %order_number,
            total = %totals.total,
            invoice = invoice.is_some(),
            "Sales order created"
        );

        if let Some(sender) = &self.event_sender {
            let event = Event::SalesOrderCreated {
                order_id,
                order_number: order_number.clone(),
            };
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, order_id = %order_id, "Failed to send sales order event");
            }
            if let Some(inv) = &invoice {
                let event = Event::InvoiceIssued {
                    invoice_id: inv.id,
                    sales_order_id: order_id,
                };
                if let Err(e) = sender.send(event).await {
                    warn!(error = %e, order_id = %order_id, "Failed to send invoice event");
                }
            }
        }

        Ok(to_response(header, item_models, invoice.map(|i| i.id)))
    }

    /// Decrements product stock with a guarded single-statement update.
    /// Aborts the transaction with `InsufficientStock` when the guard fails.
    async fn decrement_stock(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<(), ServiceError> {
        let current = ProductEntity::find_by_id(product_id)
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("Unknown product {}", product_id))
            })?;

        let result = ProductEntity::update_many()
            .col_expr(
                product::Column::StockQuantity,
                Expr::col(product::Column::StockQuantity).sub(quantity),
            )
            .filter(product::Column::Id.eq(product_id))
            .filter(product::Column::StockQuantity.gte(quantity))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            warn!(
                product_id = %product_id,
                sku = %current.sku,
                requested = quantity,
                available = current.stock_quantity,
                "Insufficient stock, aborting sales order"
            );
            return Err(ServiceError::InsufficientStock {
                sku: current.sku,
                requested: quantity,
                available: current.stock_quantity,
            });
        }
        Ok(())
    }

    /// Retrieves a sales order with its line items and linked invoice id.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_sales_order(
        &self,
        order_id: Uuid,
    ) -> Result<SalesOrderResponse, ServiceError> {
        let db = &*self.db;

        let header = SalesOrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Sales order {} not found", order_id)))?;

        let items = SalesOrderItemEntity::find()
            .filter(sales_order_item::Column::SalesOrderId.eq(order_id))
            .all(db)
            .await?;

        let invoice_id = crate::entities::invoice::Entity::find()
            .filter(crate::entities::invoice::Column::SalesOrderId.eq(order_id))
            .one(db)
            .await?
            .map(|inv| inv.id);

        Ok(to_response(header, items, invoice_id))
    }
}

/// Rejects line items the calculator would otherwise happily total up:
/// non-positive quantities and non-positive price snapshots.
pub(crate) fn validate_line_items(items: &[CreateSalesOrderItem]) -> Result<(), ServiceError> {
    for item in items {
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
    Ok(())
}

fn to_response(
    header: sales_order::Model,
    items: Vec<sales_order_item::Model>,
    invoice_id: Option<Uuid>,
) -> SalesOrderResponse {
    SalesOrderResponse {
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
            .map(|item| SalesOrderItemResponse {
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect(),
        invoice_id,
        created_at: header.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: i32, unit_price: Decimal) -> CreateSalesOrderItem {
        CreateSalesOrderItem {
            product_id: Uuid::new_v4(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn empty_items_fail_request_validation() {
        let request = CreateSalesOrderRequest {
            counterparty_id: Uuid::new_v4(),
            order_date: Utc::now(),
            items: vec![],
            generate_invoice: false,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn line_item_guards() {
        assert!(validate_line_items(&[item(0, dec!(10.00))]).is_err());
        assert!(validate_line_items(&[item(1, dec!(0))]).is_err());
        assert!(validate_line_items(&[item(1, dec!(-3.50))]).is_err());
        assert!(validate_line_items(&[item(1, dec!(10.00))]).is_ok());
    }

    #[test]
    fn response_carries_header_and_items() {
        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let counterparty_id = Uuid::new_v4();
        let header = sales_order::Model {
            id: order_id,
            order_number: "SO-20240601-000000000000000".to_string(),
            counterparty_id,
            status: OrderStatus::Pending.to_string(),
            order_date: now,
            subtotal: dec!(79.99),
            tax: dec!(7.999),
            total: dec!(87.989),
            created_at: now,
            updated_at: None,
        };
        let items = vec![sales_order_item::Model {
            id: Uuid::new_v4(),
            sales_order_id: order_id,
            product_id: Uuid::new_v4(),
            quantity: 1,
            unit_price: dec!(79.99),
            created_at: now,
        }];

        let response = to_response(header, items, None);
        assert_eq!(response.id, order_id);
        assert_eq!(response.counterparty_id, counterparty_id);
        assert_eq!(response.status, "pending");
        assert_eq!(response.total, dec!(87.989));
        assert_eq!(response.items.len(), 1);
        assert!(response.invoice_id.is_none());
    }
}
