//! Portal event bus and outbound notification delivery.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope.
//! - [`delivery`]: SMTP email delivery.
//! - [`ApprovalMailer`]: background task that emails customers once their
//!   account is approved.

pub mod approval;
pub mod bus;
pub mod delivery;

pub use approval::ApprovalMailer;
pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError, MailSender};
