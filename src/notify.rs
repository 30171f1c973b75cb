// In-process publish/subscribe channel for transient user alerts

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// How loud an alert is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Success,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
        }
    }
}

/// Payload of the single event kind the bus carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRaised {
    pub severity: Severity,
    pub title: String,
    pub details: Option<String>,
}

impl AlertRaised {
    pub fn new(severity: Severity, title: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Handle returned by `subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&AlertRaised) + Send + Sync>;

#[derive(Default)]
struct Inner {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(SubscriptionId, Handler)>>,
}

/// Fan-out of `AlertRaised` events to every registered subscriber
///
/// Clones share the same subscriber list, so one bus can be handed to the
/// repository and to the front end. Delivery is synchronous, on the publishing
/// thread, in registration order.
#[derive(Clone, Default)]
pub struct NotificationBus {
    inner: Arc<Inner>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&AlertRaised) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers().push((id, Arc::new(handler)));
        debug!(subscription = id.0, "Subscriber registered");
        id
    }

    /// Returns false if `id` was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers();
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        before != subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }

    /// Deliver `alert` to everyone currently subscribed
    ///
    /// Handlers run without the subscriber lock held, so they may subscribe or
    /// unsubscribe; such changes apply from the next publish.
    pub fn publish(&self, alert: AlertRaised) {
        let snapshot: Vec<Handler> =
            self.subscribers().iter().map(|(_, h)| Arc::clone(h)).collect();
        debug!(
            severity = %alert.severity,
            title = %alert.title,
            receivers = snapshot.len(),
            "Publishing alert"
        );
        for handler in snapshot {
            handler(&alert);
        }
    }

    pub fn error(&self, title: impl Into<String>, details: Option<String>) {
        self.emit(Severity::Error, title, details);
    }

    pub fn warning(&self, title: impl Into<String>, details: Option<String>) {
        self.emit(Severity::Warning, title, details);
    }

    pub fn info(&self, title: impl Into<String>, details: Option<String>) {
        self.emit(Severity::Info, title, details);
    }

    pub fn success(&self, title: impl Into<String>, details: Option<String>) {
        self.emit(Severity::Success, title, details);
    }

    fn emit(&self, severity: Severity, title: impl Into<String>, details: Option<String>) {
        self.publish(AlertRaised {
            severity,
            title: title.into(),
            details,
        });
    }

    fn subscribers(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Handler)>> {
        // A panicking handler never runs under the lock, so the list is always consistent
        self.inner.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

pub const DEFAULT_BANNER_SECS: i64 = 7;

/// The one transient alert a front end shows at a time
///
/// A newer alert replaces the current one; an alert auto-dismisses once its
/// display window has passed.
#[derive(Debug, Clone)]
pub struct Banner {
    ttl: TimeDelta,
    /// Alert on screen and when it goes away; `None` expiry never dismisses
    current: Option<(AlertRaised, Option<DateTime<Utc>>)>,
}

impl Default for Banner {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(DEFAULT_BANNER_SECS))
    }
}

impl Banner {
    pub fn new(ttl: TimeDelta) -> Self {
        Self { ttl, current: None }
    }

    pub fn show(&mut self, alert: AlertRaised, received_at: DateTime<Utc>) {
        self.current = Some((alert, received_at.checked_add_signed(self.ttl)));
    }

    /// The alert still on screen at `now`, dropping it if it has expired
    pub fn current(&mut self, now: DateTime<Utc>) -> Option<&AlertRaised> {
        if matches!(&self.current, Some((_, Some(expires_at))) if now >= *expires_at) {
            self.current = None;
        }
        self.current.as_ref().map(|(alert, _)| alert)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.current.as_ref().and_then(|(_, expires_at)| *expires_at)
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn recorder(
        bus: &NotificationBus,
        tag: &'static str,
        log: &Arc<Mutex<Vec<String>>>,
    ) -> SubscriptionId {
        let log = Arc::clone(log);
        bus.subscribe(move |alert| log.lock().unwrap().push(format!("{}:{}", tag, alert.title)))
    }

    #[test]
    fn test_publish_reaches_subscribers_in_registration_order() {
        let bus = NotificationBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&bus, "first", &log);
        recorder(&bus, "second", &log);

        bus.success("Saved", None);

        assert_eq!(*log.lock().unwrap(), vec!["first:Saved", "second:Saved"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = NotificationBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = recorder(&bus, "first", &log);
        recorder(&bus, "second", &log);

        assert!(bus.unsubscribe(first));
        assert!(!bus.unsubscribe(first));
        bus.info("Hello", None);

        assert_eq!(*log.lock().unwrap(), vec!["second:Hello"]);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = NotificationBus::new();
        bus.error("Nobody listening", Some("details".to_string()));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_clones_share_subscribers() {
        let bus = NotificationBus::new();
        let handle = bus.clone();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&bus, "sub", &log);

        handle.warning("Careful", None);

        assert_eq!(*log.lock().unwrap(), vec!["sub:Careful"]);
    }

    #[test]
    fn test_handler_may_subscribe_during_publish() {
        let bus = NotificationBus::new();
        let inner_bus = bus.clone();
        bus.subscribe(move |_| {
            inner_bus.subscribe(|_| {});
        });

        bus.info("grow", None);
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_helpers_set_severity() {
        let bus = NotificationBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(move |alert| sink.lock().unwrap().push(alert.clone()));

        bus.error("e", None);
        bus.warning("w", None);
        bus.info("i", None);
        bus.success("s", Some("done".to_string()));

        let seen = seen.lock().unwrap();
        let severities: Vec<Severity> = seen.iter().map(|a| a.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Error, Severity::Warning, Severity::Info, Severity::Success]
        );
        assert_eq!(seen[3].details.as_deref(), Some("done"));
    }

    #[test]
    fn test_banner_auto_dismisses_after_ttl() {
        let t0 = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let mut banner = Banner::default();
        banner.show(AlertRaised::new(Severity::Success, "Todo added"), t0);

        assert!(banner.current(t0 + TimeDelta::seconds(6)).is_some());
        assert!(banner.current(t0 + TimeDelta::seconds(7)).is_none());
        assert!(banner.expires_at().is_none());
    }

    #[test]
    fn test_banner_newer_alert_supersedes() {
        let t0 = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let mut banner = Banner::default();
        banner.show(AlertRaised::new(Severity::Info, "old"), t0);
        banner.show(AlertRaised::new(Severity::Error, "new"), t0 + TimeDelta::seconds(5));

        // Window restarts from the newer alert
        let shown = banner.current(t0 + TimeDelta::seconds(10)).cloned();
        assert_eq!(shown.map(|a| a.title), Some("new".to_string()));
    }

    #[test]
    fn test_banner_with_huge_ttl_never_expires() {
        let t0 = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let mut banner = Banner::new(TimeDelta::MAX);
        banner.show(AlertRaised::new(Severity::Info, "sticky"), t0);

        assert!(banner.expires_at().is_none());
        assert!(banner.current(t0 + TimeDelta::days(365 * 1000)).is_some());
    }

    #[test]
    fn test_banner_dismiss() {
        let t0 = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let mut banner = Banner::new(TimeDelta::seconds(30));
        banner.show(AlertRaised::new(Severity::Warning, "w").with_details("more"), t0);
        banner.dismiss();
        assert!(banner.current(t0).is_none());
    }

    #[test]
    fn test_severity_display_matches_wire_name() {
        for severity in [Severity::Error, Severity::Warning, Severity::Info, Severity::Success] {
            let wire = serde_json::to_string(&severity).unwrap();
            assert_eq!(wire, format!("\"{}\"", severity));
        }
        assert_eq!(Severity::Info.to_string(), "info");
    }
}
