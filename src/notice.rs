/// Transient status notices that expire on their own
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// How long a notice stays visible
pub const NOTICE_TTL: Duration = Duration::from_millis(3000);

/// Style hint for a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Error,
}

/// Identifies one shown notice, so a stale expiry cannot hide a newer one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoticeId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: NoticeId,
    pub message: String,
    pub tone: Tone,
    #[serde(skip)]
    pub expires_at: Duration,
}

/// Holds at most one visible notice.
///
/// Showing a notice replaces the previous one. A notice disappears when its
/// deadline passes or when [`Notifier::dismiss`] is called with its id;
/// dismissing an id that is no longer current does nothing.
#[derive(Debug, Clone)]
pub struct Notifier {
    ttl: Duration,
    next_id: u64,
    current: Option<Notice>,
}

impl Default for Notifier {
    fn default() -> Self {
        Notifier::new(NOTICE_TTL)
    }
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Notifier {
            ttl,
            next_id: 0,
            current: None,
        }
    }

    /// Show `message`, replacing whatever notice is visible
    pub fn show(&mut self, message: impl Into<String>, tone: Tone, now: Duration) -> NoticeId {
        self.next_id += 1;
        let id = NoticeId(self.next_id);
        let notice = Notice {
            id,
            message: message.into(),
            tone,
            expires_at: now + self.ttl,
        };
        debug!(id = id.0, message = %notice.message, "showing notice");
        self.current = Some(notice);
        id
    }

    /// The visible notice at time `now`, dropping it if it has expired
    pub fn visible(&mut self, now: Duration) -> Option<&Notice> {
        if self
            .current
            .as_ref()
            .is_some_and(|notice| now >= notice.expires_at)
        {
            self.current = None;
        }
        self.current.as_ref()
    }

    /// The current notice regardless of its deadline
    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    /// Hide the notice `id` if it is still the current one
    pub fn dismiss(&mut self, id: NoticeId) -> bool {
        match &self.current {
            Some(notice) if notice.id == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_notice_expires_after_ttl() {
        let mut notifier = Notifier::default();
        notifier.show("List saved successfully!", Tone::Success, ms(0));

        assert_eq!(
            notifier.visible(ms(2999)).map(|n| n.message.as_str()),
            Some("List saved successfully!")
        );
        assert!(notifier.visible(ms(3000)).is_none());
        assert!(notifier.current().is_none());
    }

    #[test]
    fn test_newer_notice_replaces_older() {
        let mut notifier = Notifier::default();
        let first = notifier.show("first", Tone::Success, ms(0));
        let second = notifier.show("second", Tone::Error, ms(1000));

        // the first notice's expiry must not hide the second
        assert!(!notifier.dismiss(first));
        assert!(notifier.visible(ms(3500)).is_some());

        assert!(notifier.dismiss(second));
        assert!(notifier.current().is_none());
    }

    #[test]
    fn test_new_notice_restarts_deadline() {
        let mut notifier = Notifier::new(ms(100));
        notifier.show("a", Tone::Success, ms(0));
        notifier.show("b", Tone::Success, ms(90));
        assert_eq!(notifier.visible(ms(150)).map(|n| n.tone), Some(Tone::Success));
        assert!(notifier.visible(ms(190)).is_none());
    }

    #[test]
    fn test_notice_serialization() {
        let mut notifier = Notifier::default();
        notifier.show("No saved list found", Tone::Error, ms(0));
        let json = serde_json::to_string(notifier.current().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"id":1,"message":"No saved list found","tone":"error"}"#
        );
    }
}
