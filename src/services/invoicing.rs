use crate::{
    db::DbPool,
    entities::invoice::{self, Entity as InvoiceEntity, InvoiceStatus},
    entities::sales_order,
    errors::ServiceError,
    services::numbering,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Days between an invoice's issue date and its due date.
pub const INVOICE_DUE_DAYS: i64 = 30;

/// Persists a draft invoice for a sales order on the given connection.
///
/// Runs on the caller's transaction so the invoice commits or rolls back
/// together with the order that originated it. The total is snapshotted from
/// the order header.
pub async fn issue_for_order<C: ConnectionTrait>(
    conn: &C,
    order: &sales_order::Model,
    issued_at: DateTime<Utc>,
) -> Result<invoice::Model, ServiceError> {
    let model = invoice::ActiveModel {
        id: Set(Uuid::new_v4()),
        invoice_number: Set(numbering::generate_invoice_number()),
        sales_order_id: Set(order.id),
        counterparty_id: Set(order.counterparty_id),
        status: Set(InvoiceStatus::Draft.to_string()),
        issue_date: Set(issued_at),
        due_date: Set(issued_at + Duration::days(INVOICE_DUE_DAYS)),
        total: Set(order.total),
        created_at: Set(issued_at),
    };

    let invoice = model
        .insert(conn)
        .await
        .map_err(ServiceError::from_write_err)?;

    info!(
        invoice_id = %invoice.id,
        sales_order_id = %order.id,
        total = %invoice.total,
        "Invoice issued"
    );

    Ok(invoice)
}

/// Read access to persisted invoices.
#[derive(Clone)]
pub struct InvoicingService {
    db: Arc<DbPool>,
}

impl InvoicingService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn get_invoice(&self, invoice_id: Uuid) -> Result<invoice::Model, ServiceError> {
        InvoiceEntity::find_by_id(invoice_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Invoice {} not found", invoice_id)))
    }

    /// Invoices emitted for a given sales order (zero or one in practice).
    #[instrument(skip(self), fields(sales_order_id = %sales_order_id))]
    pub async fn find_for_order(
        &self,
        sales_order_id: Uuid,
    ) -> Result<Vec<invoice::Model>, ServiceError> {
        let invoices = InvoiceEntity::find()
            .filter(invoice::Column::SalesOrderId.eq(sales_order_id))
            .all(&*self.db)
            .await?;
        Ok(invoices)
    }
}
