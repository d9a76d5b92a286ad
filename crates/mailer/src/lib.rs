//! Booking notifications.
//!
//! Handlers hand a [`BookingNotice`] to a [`Notifier`] and move on. The
//! [`MailDispatcher`] queues it, renders a tutor notification and a student
//! confirmation, and delivers them through a [`MailTransport`]. Delivery is
//! best effort: failures are logged and never reach the caller.

pub mod config;
pub mod dispatcher;
pub mod notice;
pub mod templates;
pub mod transport;

pub use config::MailConfig;
pub use dispatcher::MailDispatcher;
pub use notice::{BookingNotice, Notifier};
pub use templates::Email;
pub use transport::{HttpMailTransport, MailTransport};
