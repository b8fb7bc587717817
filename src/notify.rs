// Per-user notification outbox.
//
// Negotiation events notify the counterparty: a new offer notifies the
// seller, a resolution or counter notifies the other side. Each outbox is
// bounded; old entries fall off the front.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Most recent notifications kept per user
pub const MAX_OUTBOX_PER_USER: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OfferReceived,
    OfferAccepted,
    OfferRejected,
    OfferCountered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub body: String,
    /// Offer this notification is about, when there is one
    pub offer_id: Option<String>,
    pub created_at: u64,
    pub read: bool,
}

/// All outboxes keyed by user ID
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Notifier {
    outbox: HashMap<String, VecDeque<Notification>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        user_id: &str,
        kind: NotificationKind,
        body: String,
        offer_id: Option<String>,
    ) {
        let queue = self.outbox.entry(user_id.to_string()).or_default();
        queue.push_back(Notification {
            id: format!("ntf_{}", Uuid::new_v4().simple()),
            user_id: user_id.to_string(),
            kind,
            body,
            offer_id,
            created_at: now_secs(),
            read: false,
        });
        while queue.len() > MAX_OUTBOX_PER_USER {
            queue.pop_front();
        }
    }

    /// Notifications for a user, newest first.
    pub fn for_user(&self, user_id: &str) -> Vec<Notification> {
        self.outbox
            .get(user_id)
            .map(|q| q.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    pub fn unread_count(&self, user_id: &str) -> usize {
        self.outbox
            .get(user_id)
            .map(|q| q.iter().filter(|n| !n.read).count())
            .unwrap_or(0)
    }

    /// Mark everything read; returns how many flipped.
    pub fn mark_all_read(&mut self, user_id: &str) -> usize {
        let Some(queue) = self.outbox.get_mut(user_id) else {
            return 0;
        };
        let mut flipped = 0;
        for notification in queue.iter_mut() {
            if !notification.read {
                notification.read = true;
                flipped += 1;
            }
        }
        flipped
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
