use chrono::Utc;

/// Which order series a number belongs to. Numbers are unique per series,
/// enforced by a unique index on each order table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Sales,
    Purchase,
}

impl OrderKind {
    fn prefix(self) -> &'static str {
        match self {
            OrderKind::Sales => "SO",
            OrderKind::Purchase => "PO",
        }
    }
}

/// Produces a human-readable order number: series prefix plus a
/// timestamp-derived suffix, e.g. `SO-20240601-142530123456789`.
///
/// Uniqueness is best-effort. The unique index on the order table is the
/// actual guarantee; an insert that trips it surfaces as a retryable
/// `Conflict`.
pub fn generate_order_number(kind: OrderKind) -> String {
    format!("{}-{}", kind.prefix(), timestamp_suffix())
}

/// Invoice numbers use the same scheme under an `INV-` prefix.
pub fn generate_invoice_number() -> String {
    format!("INV-{}", timestamp_suffix())
}

fn timestamp_suffix() -> String {
    Utc::now().format("%Y%m%d-%H%M%S%9f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_numbers_carry_series_prefix() {
        assert!(generate_order_number(OrderKind::Sales).starts_with("SO-"));
        assert!(generate_order_number(OrderKind::Purchase).starts_with("PO-"));
        assert!(generate_invoice_number().starts_with("INV-"));
    }

    #[test]
    fn suffix_is_date_then_time() {
        let number = generate_order_number(OrderKind::Sales);
        let mut parts = number.splitn(3, '-');
        assert_eq!(parts.next(), Some("SO"));
        let date = parts.next().expect("date part");
        let time = parts.next().expect("time part");
        assert_eq!(date.len(), 8);
        assert!(date.chars().all(|c| c.is_ascii_digit()));
        assert!(time.chars().all(|c| c.is_ascii_digit()));
    }
}
