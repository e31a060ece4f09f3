// Per-login session context
// Owns the viewer identity, timezone, notification feed and the teardown token
// every background task for this login hangs off.

use crate::models::Identity;
use crate::notifications::NotificationFeed;
use crate::store::IdentityProvider;
use chrono_tz::Tz;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct SessionContext {
    identity: Identity,
    timezone: Tz,
    feed: Arc<NotificationFeed>,
    shutdown: CancellationToken,
    active: AtomicBool,
}

impl SessionContext {
    pub fn login(identity: Identity, timezone: Tz) -> Arc<Self> {
        info!("Session started for {} in {}", identity.name, timezone.name());
        Arc::new(Self {
            identity,
            timezone,
            feed: Arc::new(NotificationFeed::new()),
            shutdown: CancellationToken::new(),
            active: AtomicBool::new(true),
        })
    }

    /// `None` once the session has been logged out.
    pub fn identity(&self) -> Option<&Identity> {
        self.is_active().then_some(&self.identity)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn feed(&self) -> Arc<NotificationFeed> {
        Arc::clone(&self.feed)
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Token for a task owned by this session; cancelled on logout.
    pub fn scope(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Cancels every task scoped to the session and drops its notifications.
    pub fn logout(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            info!("Session for {} ended", self.identity.name);
            self.shutdown.cancel();
            self.feed.clear();
        }
    }
}

impl IdentityProvider for SessionContext {
    fn current_identity(&self) -> Option<Identity> {
        self.identity().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Notification, NotificationMessage};
    use chrono::Utc;

    #[test]
    fn test_logout_tears_down() {
        let session = SessionContext::login(Identity::new("Alice", "alice@example.com"), Tz::UTC);
        let scoped = session.scope();
        session
            .feed()
            .push(Notification::from_message(&NotificationMessage::new("hello"), Utc::now()));
        assert!(session.current_identity().is_some());

        session.logout();

        assert!(scoped.is_cancelled());
        assert!(session.shutdown_token().is_cancelled());
        assert!(session.feed().is_empty());
        assert!(session.current_identity().is_none());
        assert!(!session.is_active());
    }

    #[test]
    fn test_scope_created_after_logout_is_cancelled() {
        let session = SessionContext::login(Identity::new("Alice", "alice@example.com"), Tz::UTC);
        session.logout();
        assert!(session.scope().is_cancelled());
    }
}
