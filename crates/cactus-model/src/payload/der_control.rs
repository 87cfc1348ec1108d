// SPDX-License-Identifier: MIT OR Apache-2.0
//! DERControl — the scheduled/active event resource and its response
//! payload.

use super::common::DateTimeInterval;
use serde::{Deserialize, Serialize};

/// The lifecycle state of a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Scheduled to start in the future.
    Scheduled,
    /// Currently in its active interval.
    Active,
    /// Cancelled by the server before or during its interval.
    Cancelled,
    /// Superseded by a higher-primacy event.
    Superseded,
}

/// A single DERControl event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerControl {
    /// This resource's own href, once discovered.
    #[serde(rename = "@href")]
    pub href: Option<String>,
    /// This control's mRID.
    #[serde(rename = "mRID")]
    pub mrid: String,
    /// Current lifecycle state.
    pub event_status: EventStatus,
    /// The control's scheduled interval.
    pub interval: DateTimeInterval,
    /// Where to POST a [`Response`], if the server wants one.
    pub reply_to: Option<String>,
    /// Whether the server requires a response at all (and which events).
    pub response_required: Option<String>,
    /// Requested DER set point, signed percent (×0.01).
    pub set_max_w_percent: Option<i32>,
}

/// Response status codes a client can report back for a DERControl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    /// Client has received the event.
    EventReceived,
    /// The event's interval has started.
    EventStarted,
    /// The event's interval has completed.
    EventCompleted,
    /// The event was cancelled.
    EventCancelled,
    /// The event was superseded by a higher-primacy event.
    EventSuperseded,
}

impl ResponseStatus {
    /// The wire (integer) status code.
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::EventReceived => 1,
            Self::EventStarted => 2,
            Self::EventCompleted => 3,
            Self::EventCancelled => 4,
            Self::EventSuperseded => 5,
        }
    }

    /// The `responses` annotation-namespace tag for this status.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::EventReceived => "EVENT_RECEIVED",
            Self::EventStarted => "EVENT_STARTED",
            Self::EventCompleted => "EVENT_COMPLETED",
            Self::EventCancelled => "EVENT_CANCELLED",
            Self::EventSuperseded => "EVENT_SUPERSEDED",
        }
    }
}

/// A client response to a DERControl (or DefaultDERControl) event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// LFDI of the end device sending this response.
    pub end_device_l_fdi: String,
    /// Response status.
    pub status: u32,
    /// When this response was created, unix seconds.
    pub created_date_time: i64,
    /// The mRID of the DERControl this is a response to.
    pub subject: String,
}

impl Response {
    /// Build a response for `subject` (the control's mRID) on behalf of
    /// `end_device_l_fdi`, stamped at `created_date_time`.
    #[must_use]
    pub fn new(
        end_device_l_fdi: impl Into<String>,
        status: ResponseStatus,
        created_date_time: i64,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            end_device_l_fdi: end_device_l_fdi.into(),
            status: status.code(),
            created_date_time,
            subject: subject.into(),
        }
    }
}
