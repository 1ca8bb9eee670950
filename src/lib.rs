//! Ledgerline
//!
//! Transactional order-processing core for a small-business ERP: sales and
//! purchase order creation, stock decrement, invoicing and wallet payments,
//! each executed as a single database transaction. The web/UI layer that
//! drives these processors lives outside this crate.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod logging;
pub mod migrator;
pub mod services;

pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::db::{DbPool, establish_connection, run_migrations};
    pub use crate::errors::ServiceError;
    pub use crate::events::{Event, EventSender};
    pub use crate::services::invoicing::InvoicingService;
    pub use crate::services::orders::SalesOrderService;
    pub use crate::services::payments::PaymentService;
    pub use crate::services::pricing::{compute_order_totals, OrderTotals};
    pub use crate::services::procurement::PurchaseOrderService;
}
