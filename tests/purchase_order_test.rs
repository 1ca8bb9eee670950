mod common;

use chrono::Utc;
use ledgerline::{
    entities::{product, purchase_order},
    errors::ServiceError,
    services::procurement::{
        CreatePurchaseOrderItem, CreatePurchaseOrderRequest, PurchaseOrderService,
    },
};
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use uuid::Uuid;

fn order_request(
    counterparty_id: Uuid,
    items: Vec<CreatePurchaseOrderItem>,
) -> CreatePurchaseOrderRequest {
    CreatePurchaseOrderRequest {
        counterparty_id,
        order_date: Utc::now(),
        items,
    }
}

#[tokio::test]
async fn creates_order_without_touching_stock() {
    let db = common::setup_db().await;
    let vendor = common::seed_counterparty(&db, "Acme Supplies", "VENDOR").await;
    let widget = common::seed_product(&db, "SKU-WIDGET", 7, dec!(30.00)).await;

    let service = PurchaseOrderService::new(db.clone(), None);
    let order = service
        .create_purchase_order(order_request(
            vendor.id,
            vec![CreatePurchaseOrderItem {
                product_id: widget.id,
                quantity: 4,
                unit_price: dec!(30.00),
            }],
        ))
        .await
        .expect("purchase order should be created");

    assert!(order.order_number.starts_with("PO-"));
    assert_eq!(order.status, "pending");
    assert_eq!(order.subtotal, dec!(120.00));
    assert_eq!(order.tax, dec!(12.00));
    assert_eq!(order.total, dec!(132.00));
    assert_eq!(order.items.len(), 1);

    // Stock moves only on the separate receive step.
    let stock = product::Entity::find_by_id(widget.id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap()
        .stock_quantity;
    assert_eq!(stock, 7);

    let fetched = service.get_purchase_order(order.id).await.unwrap();
    assert_eq!(fetched.order_number, order.order_number);
    assert_eq!(fetched.total, order.total);
}

#[tokio::test]
async fn requires_vendor_role() {
    let db = common::setup_db().await;
    let client_only = common::seed_counterparty(&db, "Northwind", "CLIENT").await;
    let widget = common::seed_product(&db, "SKU-WIDGET", 7, dec!(30.00)).await;

    let service = PurchaseOrderService::new(db.clone(), None);
    let err = service
        .create_purchase_order(order_request(
            client_only.id,
            vec![CreatePurchaseOrderItem {
                product_id: widget.id,
                quantity: 1,
                unit_price: dec!(30.00),
            }],
        ))
        .await
        .expect_err("client-only counterparty must be rejected");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let orders = purchase_order::Entity::find().count(&*db).await.unwrap();
    assert_eq!(orders, 0);
}

#[tokio::test]
async fn dual_role_counterparty_can_supply() {
    let db = common::setup_db().await;
    let both = common::seed_counterparty(&db, "Omni Trading", "CLIENT,VENDOR").await;
    let widget = common::seed_product(&db, "SKU-WIDGET", 2, dec!(18.25)).await;

    let service = PurchaseOrderService::new(db.clone(), None);
    let order = service
        .create_purchase_order(order_request(
            both.id,
            vec![CreatePurchaseOrderItem {
                product_id: widget.id,
                quantity: 2,
                unit_price: dec!(18.25),
            }],
        ))
        .await
        .expect("dual-role counterparty should be accepted");
    assert_eq!(order.subtotal, dec!(36.50));
}

#[tokio::test]
async fn rejects_empty_and_invalid_items() {
    let db = common::setup_db().await;
    let vendor = common::seed_counterparty(&db, "Acme Supplies", "VENDOR").await;
    let widget = common::seed_product(&db, "SKU-WIDGET", 7, dec!(30.00)).await;
    let service = PurchaseOrderService::new(db.clone(), None);

    let err = service
        .create_purchase_order(order_request(vendor.id, vec![]))
        .await
        .expect_err("empty orders must be rejected");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let err = service
        .create_purchase_order(order_request(
            vendor.id,
            vec![CreatePurchaseOrderItem {
                product_id: widget.id,
                quantity: 0,
                unit_price: dec!(30.00),
            }],
        ))
        .await
        .expect_err("zero quantity must be rejected");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let err = service
        .create_purchase_order(order_request(
            vendor.id,
            vec![CreatePurchaseOrderItem {
                product_id: Uuid::new_v4(),
                quantity: 1,
                unit_price: dec!(30.00),
            }],
        ))
        .await
        .expect_err("unknown product must be rejected");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let orders = purchase_order::Entity::find().count(&*db).await.unwrap();
    assert_eq!(orders, 0);
}
