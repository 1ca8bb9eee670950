pub mod counterparty;
pub mod invoice;
pub mod payment;
pub mod product;
pub mod purchase_order;
pub mod purchase_order_item;
pub mod sales_order;
pub mod sales_order_item;
pub mod wallet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle status shared by sales and purchase orders. Orders are created
/// `Pending`; the remaining transitions happen through fulfilment and receive
/// actions outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Fulfilled,
    Received,
    Cancelled,
}
