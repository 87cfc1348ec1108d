// SPDX-License-Identifier: MIT OR Apache-2.0
//! The response tracker: an append-only log of every server response
//! and inbound notification, plus the single "active request" slot the UI
//! polls while a request is in flight.

use cactus_model::ResourceKind;
use cactus_protocol::validate::ValidationResult;
use cactus_protocol::{RequestDescriptor, RequestObserver, RequestRecord};
use std::sync::Mutex;

/// A parsed inbound notification, logged alongside server responses so the
/// results evaluator can count XSD errors across both.
#[derive(Debug, Clone)]
pub struct NotificationEntry {
    /// The subscribed resource's href, as carried by the envelope.
    pub subscribed_resource: String,
    /// The embedded resource's decoded kind, if any.
    pub resource_kind: Option<ResourceKind>,
    /// Validation outcome for the embedded resource body, if validated.
    pub validation: Option<ValidationResult>,
}

/// One entry in the response tracker's timeline.
#[derive(Debug, Clone)]
pub enum ResponseTrackerEntry {
    /// A completed client request/response pair.
    ServerResponse(RequestRecord),
    /// An inbound push notification delivered to a webhook.
    NotificationRequest(NotificationEntry),
}

impl ResponseTrackerEntry {
    /// Number of XSD validation errors this entry carries, if validated.
    #[must_use]
    pub fn xsd_error_count(&self) -> usize {
        let validation = match self {
            Self::ServerResponse(record) => record.validation.as_ref(),
            Self::NotificationRequest(entry) => entry.validation.as_ref(),
        };
        validation.map_or(0, |v| v.errors.len())
    }
}

#[derive(Default)]
struct State {
    entries: Vec<ResponseTrackerEntry>,
    active: Option<RequestDescriptor>,
}

/// Ordered log of responses and notifications, with the current
/// in-flight request exposed for UI polling.
///
/// Implements [`RequestObserver`] directly so a `cactus-protocol` client can
/// be handed an `Arc<ResponseTracker>` as its observer with no adapter.
#[derive(Default)]
pub struct ResponseTracker {
    state: Mutex<State>,
}

impl ResponseTracker {
    /// An empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification entry to the timeline.
    pub fn record_notification(&self, entry: NotificationEntry) {
        self.state.lock().unwrap().entries.push(ResponseTrackerEntry::NotificationRequest(entry));
    }

    /// Snapshot of the timeline in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<ResponseTrackerEntry> {
        self.state.lock().unwrap().entries.clone()
    }

    /// The request currently in flight, if any.
    #[must_use]
    pub fn active_request(&self) -> Option<RequestDescriptor> {
        self.state.lock().unwrap().active.clone()
    }

    /// Total XSD validation errors across every logged response and
    /// notification.
    #[must_use]
    pub fn total_xsd_errors(&self) -> usize {
        self.state.lock().unwrap().entries.iter().map(ResponseTrackerEntry::xsd_error_count).sum()
    }
}

impl RequestObserver for ResponseTracker {
    fn before_request(&self, descriptor: &RequestDescriptor, _attempt: u32) {
        self.state.lock().unwrap().active = Some(descriptor.clone());
    }

    fn after_request(&self, record: RequestRecord) {
        let mut state = self.state.lock().unwrap();
        state.active = None;
        state.entries.push(ResponseTrackerEntry::ServerResponse(record));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn descriptor() -> RequestDescriptor {
        RequestDescriptor { client_alias: "client-1".into(), step_id: "s1".into(), method: "GET".into(), path: "/edev".into() }
    }

    #[test]
    fn before_request_sets_active_after_request_clears_it() {
        let tracker = ResponseTracker::new();
        assert!(tracker.active_request().is_none());
        tracker.before_request(&descriptor(), 0);
        assert!(tracker.active_request().is_some());

        tracker.after_request(RequestRecord {
            descriptor: descriptor(),
            attempt: 0,
            status: Some(200),
            request_body: None,
            response_body: None,
            validation: None,
            duration: Duration::from_millis(10),
        });
        assert!(tracker.active_request().is_none());
        assert_eq!(tracker.entries().len(), 1);
    }

    #[test]
    fn total_xsd_errors_sums_across_responses_and_notifications() {
        let tracker = ResponseTracker::new();
        tracker.after_request(RequestRecord {
            descriptor: descriptor(),
            attempt: 0,
            status: Some(200),
            request_body: None,
            response_body: None,
            validation: Some(ValidationResult { valid: false, errors: vec!["bad".into()], warnings: vec![] }),
            duration: Duration::from_millis(1),
        });
        tracker.record_notification(NotificationEntry {
            subscribed_resource: "/edev/1".into(),
            resource_kind: Some(ResourceKind::EndDevice),
            validation: Some(ValidationResult { valid: false, errors: vec!["bad".into(), "worse".into()], warnings: vec![] }),
        });
        assert_eq!(tracker.total_xsd_errors(), 3);
    }
}
