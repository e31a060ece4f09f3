// Live notification listener
// Pushes server messages into the session feed and nudges the room cache

mod feed;

pub use feed::NotificationFeed;

use crate::cache::Revalidator;
use crate::models::{Notification, NotificationMessage};
use crate::session::SessionContext;
use crate::store::{NotificationChannel, StoreError};
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc::{Receiver, Sender};

/// Subscribes the signed-in user and handles messages until the channel
/// closes or the session ends. Returns how many messages were handled.
pub async fn run_listener(
    channel: Arc<dyn NotificationChannel>,
    session: Arc<SessionContext>,
    revalidator: Option<Arc<dyn Revalidator>>,
    sender: Option<Sender<Notification>>,
) -> Result<usize, StoreError> {
    let identity = match session.identity() {
        Some(identity) => identity.clone(),
        None => {
            debug!("No active session, notification listener not started");
            return Ok(0);
        }
    };

    let scope = session.scope();
    let receiver = tokio::select! {
        subscribed = channel.subscribe(&identity) => subscribed?,
        _ = scope.cancelled() => return Ok(0),
    };
    info!("Listening for notifications for {}", identity.email);

    Ok(listen(receiver, &session, revalidator.as_deref(), sender.as_ref(), &scope).await)
}

async fn listen(
    mut receiver: Receiver<NotificationMessage>,
    session: &SessionContext,
    revalidator: Option<&dyn Revalidator>,
    sender: Option<&Sender<Notification>>,
    scope: &tokio_util::sync::CancellationToken,
) -> usize {
    let feed = session.feed();
    let mut handled = 0;

    loop {
        let message = tokio::select! {
            message = receiver.recv() => message,
            _ = scope.cancelled() => {
                info!("Session ended, stopping notification listener");
                break;
            }
        };

        let Some(message) = message else {
            info!("Notification channel closed");
            break;
        };

        let notification = Notification::from_message(&message, Utc::now());
        debug!("Notification received: {}", notification.message);

        // Advisory only: the feed entry is kept whether or not the room is known.
        if let (Some(revalidator), Some(room_id)) = (revalidator, notification.room_id.as_deref()) {
            revalidator.invalidate(room_id);
        }

        feed.push(notification.clone());
        handled += 1;

        if let Some(tx) = sender {
            if let Err(e) = tx.send(notification).await {
                warn!("Notification subscriber dropped: {}", e);
            }
        }
    }

    handled
}
