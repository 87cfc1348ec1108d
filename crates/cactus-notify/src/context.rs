// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-client notification context: `fetch-webhook`, `collect`,
//! `update-enabled`, `safely-delete-all`.

use crate::collector::CollectorClient;
use crate::decode::{decode_resource_xml, DecodedResource};
use crate::envelope::parse_notification;
use cactus_error::NotificationKind;
use cactus_model::payload::notification::NotificationStatus;
use cactus_model::payload::Payload;
use cactus_model::{ResourceId, ResourceKind, StoredResource};
use cactus_store::ResourceStore;
use std::collections::BTreeMap;
use std::time::SystemTime;

/// A registered webhook endpoint: the collector's own id/uri plus the
/// resource it was subscribed against.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Collector-assigned endpoint identifier.
    pub id: String,
    /// The webhook URI handed to the server under test.
    pub uri: String,
    /// Resource kind subscribed to.
    pub resource_kind: ResourceKind,
    /// href of the subscribed resource.
    pub resource_href: String,
}

/// Outcome of a [`NotificationsContext::collect`] call.
#[derive(Debug, Clone, Default)]
pub struct CollectOutcome {
    /// Number of notification bodies retrieved across every endpoint.
    pub notifications: usize,
    /// Non-fatal divergences observed while processing (mismatched
    /// `subscribedResource`, unrecognised `xsi:type`, malformed body, wrong
    /// `Content-Type`). Never fails the call.
    pub warnings: Vec<String>,
}

/// One client's view of every subscription alias it has registered
/// webhooks under.
pub struct NotificationsContext {
    collector: CollectorClient,
    endpoints_by_sub_alias: BTreeMap<String, Vec<Endpoint>>,
}

impl NotificationsContext {
    /// Build a context talking to the collector at `collector_base_url`.
    #[must_use]
    pub fn new(collector_base_url: impl Into<String>) -> Self {
        Self {
            collector: CollectorClient::new(collector_base_url),
            endpoints_by_sub_alias: BTreeMap::new(),
        }
    }

    /// `fetch-webhook`: return the webhook uri already registered for
    /// `(sub_alias, resource_href)`, or create and record a new one.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationKind::CollectorFailure`] if creating a new
    /// endpoint fails.
    pub async fn fetch_webhook(
        &mut self,
        sub_alias: &str,
        kind: ResourceKind,
        resource_href: &str,
    ) -> Result<String, NotificationKind> {
        if let Some(existing) = self
            .endpoints_by_sub_alias
            .get(sub_alias)
            .and_then(|endpoints| endpoints.iter().find(|e| e.resource_href == resource_href))
        {
            return Ok(existing.uri.clone());
        }

        let created = self.collector.create_endpoint().await?;
        let uri = created.fully_qualified_webhook_uri.clone();
        self.endpoints_by_sub_alias.entry(sub_alias.to_string()).or_default().push(Endpoint {
            id: created.endpoint_id,
            uri: uri.clone(),
            resource_kind: kind,
            resource_href: resource_href.to_string(),
        });
        Ok(uri)
    }

    /// `collect`: fetch every queued notification for every endpoint
    /// under `sub_alias`, in endpoint order, applying each to `store`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationKind::UnknownAlias`] if `sub_alias` has no
    /// registered endpoints, or [`NotificationKind::CollectorFailure`] if
    /// any endpoint's GET fails. Individual malformed/unexpected
    /// notifications degrade to warnings rather than failing the call.
    pub async fn collect(&self, sub_alias: &str, store: &mut ResourceStore) -> Result<CollectOutcome, NotificationKind> {
        let endpoints = self
            .endpoints_by_sub_alias
            .get(sub_alias)
            .filter(|endpoints| !endpoints.is_empty())
            .ok_or_else(|| NotificationKind::UnknownAlias { alias: sub_alias.to_string() })?;

        let mut outcome = CollectOutcome::default();

        for endpoint in endpoints {
            let bodies = self.collector.collect(&endpoint.id).await?;
            for body in bodies {
                outcome.notifications += 1;
                self.apply_one(sub_alias, endpoint, &body, store, &mut outcome.warnings);
            }
        }

        Ok(outcome)
    }

    fn apply_one(&self, sub_alias: &str, endpoint: &Endpoint, body: &str, store: &mut ResourceStore, warnings: &mut Vec<String>) {
        let notification = match parse_notification(body) {
            Ok(n) => n,
            Err(reason) => {
                warnings.push(format!("{}: malformed notification: {reason}", endpoint.id));
                return;
            }
        };

        if notification.subscribed_resource != endpoint.resource_href {
            warnings.push(format!(
                "{}: notification subscribedResource {} does not match subscribed resource {}",
                endpoint.id, notification.subscribed_resource, endpoint.resource_href
            ));
        }

        match notification.status {
            NotificationStatus::SubscriptionCancelled => {
                tracing::debug!(target: "cactus.notify", endpoint = %endpoint.id, "subscription cancelled");
            }
            NotificationStatus::Default => {
                let Some(kind) = notification.resource_kind else {
                    warnings.push(format!("{}: notification carried an unrecognised resource type", endpoint.id));
                    return;
                };
                let Some(xml) = notification.resource_xml.as_deref() else {
                    warnings.push(format!("{}: DEFAULT notification carried no resource body", endpoint.id));
                    return;
                };
                match decode_resource_xml(kind, xml) {
                    Ok(DecodedResource::Single(payload)) => self.upsert_tagged(store, sub_alias, payload),
                    Ok(DecodedResource::List(items)) => {
                        for item in items {
                            self.upsert_tagged(store, sub_alias, item);
                        }
                    }
                    Err(reason) => warnings.push(format!("{}: {reason}", endpoint.id)),
                }
            }
        }
    }

    fn upsert_tagged(&self, store: &mut ResourceStore, sub_alias: &str, payload: Payload) {
        let kind = payload.kind();
        let Some(href) = payload.href().map(ToString::to_string) else {
            tracing::debug!(target: "cactus.notify", ?kind, "notification resource carried no href, dropping");
            return;
        };
        let id = store.find_id(kind, &href).unwrap_or_else(|| ResourceId::root(kind, href.clone()));
        let child_links = payload.child_links().into_iter().collect();
        store.upsert(StoredResource {
            id: id.clone(),
            created_at: SystemTime::now(),
            payload,
            child_links,
            member_of_list: None,
        });
        store.annotations_mut(&id).add_tag("subscription-received", sub_alias);
    }

    /// `update-enabled`: PUT the enabled flag to every endpoint under
    /// `sub_alias`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationKind::UnknownAlias`] if `sub_alias` has no
    /// registered endpoints, or [`NotificationKind::CollectorFailure`] if
    /// any endpoint's PUT fails.
    pub async fn update_enabled(&self, sub_alias: &str, enabled: bool) -> Result<(), NotificationKind> {
        let endpoints = self
            .endpoints_by_sub_alias
            .get(sub_alias)
            .ok_or_else(|| NotificationKind::UnknownAlias { alias: sub_alias.to_string() })?;
        for endpoint in endpoints {
            self.collector.set_enabled(&endpoint.id, enabled).await?;
        }
        Ok(())
    }

    /// `safely-delete-all`: tear down every registered endpoint.
    /// Never raises — a failed DELETE is logged and shutdown continues.
    pub async fn safely_delete_all(&mut self) {
        for (alias, endpoints) in std::mem::take(&mut self.endpoints_by_sub_alias) {
            for endpoint in endpoints {
                if let Err(e) = self.collector.delete_endpoint(&endpoint.id).await {
                    tracing::warn!(target: "cactus.notify", alias = %alias, endpoint = %endpoint.id, error = %e, "failed to delete notification endpoint during shutdown");
                }
            }
        }
    }
}
