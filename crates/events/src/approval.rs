//! Account-approval emails.
//!
//! [`ApprovalMailer`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and, for every `customer.approved` event, sends the customer a welcome
//! email. Sending is fire-and-forget: each email runs in its own task and
//! failures are logged, never retried.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::bus::{PlatformEvent, CUSTOMER_APPROVED};
use crate::delivery::email::MailSender;

pub const APPROVAL_SUBJECT: &str = "Your portal account has been approved";

/// Plain-text body of the approval email.
pub fn approval_body(name: &str) -> String {
    let greeting = match name.trim() {
        "" => "Hello".to_string(),
        name => format!("Hello {name}"),
    };
    format!(
        "{greeting},\n\nyour account has been approved. You can now sign in and \
         start onboarding: watch the intro videos and fill in the business checklist.\n"
    )
}

/// Background service that emails customers when they are approved.
pub struct ApprovalMailer;

impl ApprovalMailer {
    /// Run until the bus is dropped.
    pub async fn run(mailer: Arc<dyn MailSender>, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) if event.event_type == CUSTOMER_APPROVED => {
                    Self::dispatch(Arc::clone(&mailer), event);
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Approval mailer lagged, some emails were not sent");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, approval mailer shutting down");
                    break;
                }
            }
        }
    }

    fn dispatch(mailer: Arc<dyn MailSender>, event: PlatformEvent) {
        let Some(email) = event.payload_str("email").map(str::to_owned) else {
            tracing::warn!(customer_id = ?event.customer_id, "Approval event without email address");
            return;
        };
        let body = approval_body(event.payload_str("name").unwrap_or_default());
        let customer_id = event.customer_id;

        tokio::spawn(async move {
            if let Err(e) = mailer.send(&email, APPROVAL_SUBJECT, &body).await {
                tracing::error!(error = %e, customer_id = ?customer_id, "Failed to send approval email");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::bus::EventBus;
    use crate::delivery::email::EmailError;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl MailSender for RecordingSender {
        async fn send(&self, to_email: &str, _subject: &str, body: &str) -> Result<(), EmailError> {
            self.sent
                .lock()
                .unwrap()
                .push((to_email.to_string(), body.to_string()));
            Ok(())
        }
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[test]
    fn body_greets_by_name() {
        assert!(approval_body("Ada").starts_with("Hello Ada,"));
        assert!(approval_body("  ").starts_with("Hello,"));
    }

    #[tokio::test]
    async fn sends_only_for_approval_events() {
        let bus = EventBus::default();
        let sender = Arc::new(RecordingSender::default());
        let task = tokio::spawn(ApprovalMailer::run(sender.clone(), bus.subscribe()));

        bus.publish(PlatformEvent::new("metrics.captured").with_customer(1));
        bus.publish(
            PlatformEvent::new(CUSTOMER_APPROVED)
                .with_customer(2)
                .with_payload(serde_json::json!({"email": "ada@example.com", "name": "Ada"})),
        );
        bus.publish(PlatformEvent::new(CUSTOMER_APPROVED).with_customer(3));
        settle().await;

        let sent = sender.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "ada@example.com");
        assert!(sent[0].1.contains("Hello Ada"));

        drop(bus);
        task.await.unwrap();
    }
}
