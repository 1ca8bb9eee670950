pub mod invoicing;
pub mod numbering;
pub mod orders;
pub mod payments;
pub mod pricing;
pub mod procurement;
