use std::sync::Arc;

use eyre::Result;
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    Semaphore,
};

use crate::{
    config::MailConfig,
    notice::{BookingNotice, Notifier},
    templates,
    transport::{HttpMailTransport, MailTransport},
};

/// Queues booking notices for a background worker.
///
/// The queue is bounded: when it is full the notice is dropped with a warning
/// rather than making the booking request wait.
#[derive(Debug, Clone)]
pub struct MailDispatcher {
    sender: Option<mpsc::Sender<BookingNotice>>,
}

impl MailDispatcher {
    /// A dispatcher that accepts notices and does nothing with them.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Starts the HTTP-backed worker, or a no-op dispatcher when mail is not configured.
    /// Must run inside a tokio runtime.
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        if !config.is_configured() {
            tracing::info!("Mail credentials not configured; booking e-mails are disabled");
            return Ok(Self::disabled());
        }

        let transport = HttpMailTransport::new(config)?;
        Ok(Self::spawn(config, Arc::new(transport)))
    }

    /// Starts a worker that delivers through `transport`. Must run inside a tokio runtime.
    pub fn spawn(config: &MailConfig, transport: Arc<dyn MailTransport>) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let in_flight = Arc::new(Semaphore::new(config.max_in_flight.max(1)));
        tokio::spawn(dispatch_loop(receiver, transport, in_flight));
        Self {
            sender: Some(sender),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }
}

impl Notifier for MailDispatcher {
    fn notify_booking(&self, notice: BookingNotice) {
        let Some(sender) = &self.sender else {
            return;
        };

        match sender.try_send(notice) {
            Ok(()) => {}
            Err(TrySendError::Full(notice)) => {
                tracing::warn!(
                    "Mail queue full; dropping booking notice for {} at {}",
                    notice.tutor_email,
                    notice.scheduled_at
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("Mail worker has stopped; dropping booking notice");
            }
        }
    }
}

async fn dispatch_loop(
    mut receiver: mpsc::Receiver<BookingNotice>,
    transport: Arc<dyn MailTransport>,
    in_flight: Arc<Semaphore>,
) {
    while let Some(notice) = receiver.recv().await {
        let Ok(permit) = in_flight.clone().acquire_owned().await else {
            break;
        };
        let transport = transport.clone();
        tokio::spawn(async move {
            deliver(transport.as_ref(), &notice).await;
            drop(permit);
        });
    }
    tracing::debug!("Mail dispatcher stopped");
}

async fn deliver(transport: &dyn MailTransport, notice: &BookingNotice) {
    for email in templates::render(notice) {
        if let Err(err) = transport.send(&email).await {
            tracing::warn!("Failed to send booking e-mail to {}: {:#}", email.to, err);
        }
    }
}
