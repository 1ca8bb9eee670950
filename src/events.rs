use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the processors after a transaction commits.
///
/// Delivery is best-effort: a full or closed channel is logged and never
/// fails the originating operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    SalesOrderCreated {
        order_id: Uuid,
        order_number: String,
    },
    PurchaseOrderCreated {
        order_id: Uuid,
        order_number: String,
    },
    InvoiceIssued {
        invoice_id: Uuid,
        sales_order_id: Uuid,
    },
    PaymentRecorded {
        payment_id: Uuid,
        wallet_id: Uuid,
        amount: Decimal,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates an event channel with the given buffer size.
pub fn channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender::new(tx), rx)
}

/// Drains the event channel, logging each event as structured JSON.
/// Spawn this on the runtime next to the services that publish.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(event = %payload, "event processed"),
            Err(e) => warn!(error = %e, "failed to serialize event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_round_trip_through_channel() {
        let (sender, mut rx) = channel(8);
        let order_id = Uuid::new_v4();
        sender
            .send(Event::SalesOrderCreated {
                order_id,
                order_number: "SO-20250101-000000000000000".to_string(),
            })
            .await
            .expect("send should succeed");

        match rx.recv().await {
            Some(Event::SalesOrderCreated { order_id: got, .. }) => assert_eq!(got, order_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (sender, rx) = channel(1);
        drop(rx);
        let result = sender
            .send(Event::InvoiceIssued {
                invoice_id: Uuid::new_v4(),
                sales_order_id: Uuid::new_v4(),
            })
            .await;
        assert!(result.is_err());
    }
}
