// SPDX-License-Identifier: MIT OR Apache-2.0
//! Hand-rolled parsing of the Notification envelope.
//!
//! The envelope's embedded resource is polymorphic (its element name names
//! the resource kind, per the `xsi:type`-style dispatch table in
//! `cactus_model::payload::notification`), so it can't be handed to a single
//! `serde`-derived struct the way every other payload in this workspace is.
//! This walks the XML event stream directly and slices out the embedded
//! resource's raw XML for a kind-specific re-parse by [`crate::decode`].

use cactus_model::payload::notification::{resource_kind_from_xsi_type, Notification, NotificationStatus};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

enum PendingText {
    SubscribedResource,
    Status,
}

/// Parse one notification envelope body.
///
/// # Errors
///
/// Returns a human-readable reason if the body is not well-formed XML or is
/// missing the `subscribedResource` element. Callers treat this as a
/// per-notification warning, never a hard failure.
pub fn parse_notification(xml: &str) -> Result<Notification, String> {
    let mut reader = Reader::from_str(xml);

    let mut depth: u32 = 0;
    let mut subscribed_resource: Option<String> = None;
    let mut status = NotificationStatus::Default;
    let mut pending_text: Option<PendingText> = None;
    let mut child_tag: Option<String> = None;
    let mut child_start: Option<usize> = None;
    let mut resource_kind = None;
    let mut resource_xml = None;

    loop {
        let pos = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| format!("xml parse error: {e}"))?;
        match event {
            Event::Start(start) => {
                depth += 1;
                if depth == 2 {
                    let name = local_name(&start);
                    match name.as_str() {
                        "subscribedResource" => {
                            pending_text = match attr(&start, "href") {
                                Some(href) => {
                                    subscribed_resource = Some(href);
                                    None
                                }
                                None => Some(PendingText::SubscribedResource),
                            };
                        }
                        "status" => pending_text = Some(PendingText::Status),
                        other => {
                            child_tag = Some(other.to_string());
                            child_start = Some(pos);
                        }
                    }
                }
            }
            Event::Empty(start) => {
                if depth + 1 == 2 && local_name(&start) == "subscribedResource" {
                    if let Some(href) = attr(&start, "href") {
                        subscribed_resource = Some(href);
                    }
                }
            }
            Event::Text(text) => {
                if let Some(field) = pending_text.take() {
                    let value = text.unescape().map(|c| c.into_owned()).unwrap_or_default();
                    match field {
                        PendingText::SubscribedResource => subscribed_resource = Some(value),
                        PendingText::Status => status = status_from_text(&value),
                    }
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    if let (Some(tag), Some(start)) = (child_tag.take(), child_start.take()) {
                        let end = reader.buffer_position() as usize;
                        resource_kind = resource_kind_from_xsi_type(&tag);
                        resource_xml = Some(xml[start..end].to_string());
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let subscribed_resource = subscribed_resource.ok_or_else(|| "missing subscribedResource".to_string())?;
    let is_default = status == NotificationStatus::Default;

    Ok(Notification {
        subscribed_resource,
        status,
        resource_kind: if is_default { resource_kind } else { None },
        resource_xml: if is_default { resource_xml } else { None },
        content_type: None,
    })
}

fn status_from_text(text: &str) -> NotificationStatus {
    match text.trim() {
        "0" => NotificationStatus::Default,
        _ => NotificationStatus::SubscriptionCancelled,
    }
}

fn local_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.name().local_name().as_ref()).into_owned()
}

fn attr(start: &BytesStart, name: &str) -> Option<String> {
    start
        .attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name.as_bytes())
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cactus_model::payload::end_device::EndDevice;

    #[test]
    fn parses_a_default_end_device_notification() {
        let device = EndDevice {
            href: Some("/edev/1".into()),
            l_fdi: "AA".repeat(20),
            s_fdi: 1,
            device_category: "0400".into(),
            enabled: true,
            post_rate: None,
            connection_point_link: None,
            registration_link: None,
            function_set_assignments_list_link: None,
            der_list_link: None,
            subscription_list_link: None,
        };
        let xml = format!(
            r#"<Notification><subscribedResource href="/edev/1"/><status>0</status>{}</Notification>"#,
            quick_xml::se::to_string(&device).unwrap()
        );

        let n = parse_notification(&xml).unwrap();
        assert_eq!(n.subscribed_resource, "/edev/1");
        assert_eq!(n.status, NotificationStatus::Default);
        assert_eq!(n.resource_kind, Some(cactus_model::ResourceKind::EndDevice));
        assert!(n.resource_xml.as_deref().unwrap().starts_with("<EndDevice"));
    }

    #[test]
    fn cancellation_carries_no_resource() {
        let xml = r#"<Notification>
            <subscribedResource href="/edev/1/sub/1"/>
            <status>1</status>
        </Notification>"#;

        let n = parse_notification(xml).unwrap();
        assert_eq!(n.status, NotificationStatus::SubscriptionCancelled);
        assert!(n.resource_kind.is_none());
        assert!(n.resource_xml.is_none());
    }

    #[test]
    fn missing_subscribed_resource_is_an_error() {
        let xml = "<Notification><status>0</status></Notification>";
        assert!(parse_notification(xml).is_err());
    }
}
