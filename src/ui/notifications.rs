//! Transient banners and the connection status bar.

use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

pub const BANNER_TTL: Duration = Duration::from_secs(3);
pub const STATUS_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: Instant,
    announced: bool,
}

impl Notification {
    fn new(kind: NotificationKind, message: String, now: Instant, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message,
            expires_at: now + ttl,
            announced: false,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Visible banners plus the single status-bar slot.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    banners: Vec<Notification>,
    status: Option<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows a banner that hides itself after `BANNER_TTL`.
    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) -> Uuid {
        self.notify_at(kind, message, Instant::now())
    }

    pub fn notify_at(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Instant,
    ) -> Uuid {
        let banner = Notification::new(kind, message.into(), now, BANNER_TTL);
        let id = banner.id;
        self.banners.push(banner);
        id
    }

    /// Replaces the status bar text; it hides after `STATUS_TTL`.
    pub fn set_status(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.set_status_at(kind, message, Instant::now());
    }

    pub fn set_status_at(&mut self, kind: NotificationKind, message: impl Into<String>, now: Instant) {
        self.status = Some(Notification::new(kind, message.into(), now, STATUS_TTL));
    }

    /// Drops everything whose time is up.
    pub fn expire(&mut self, now: Instant) {
        self.banners.retain(|b| !b.is_expired(now));
        if self.status.as_ref().is_some_and(|s| s.is_expired(now)) {
            self.status = None;
        }
    }

    pub fn banners(&self) -> &[Notification] {
        &self.banners
    }

    pub fn status(&self) -> Option<&Notification> {
        self.status.as_ref()
    }

    /// Banners and status not yet handed to the printer, oldest first.
    pub fn take_unannounced(&mut self) -> Vec<Notification> {
        let mut fresh = Vec::new();
        for banner in self.banners.iter_mut().filter(|b| !b.announced) {
            banner.announced = true;
            fresh.push(banner.clone());
        }
        if let Some(status) = self.status.as_mut().filter(|s| !s.announced) {
            status.announced = true;
            fresh.push(status.clone());
        }
        fresh
    }
}
