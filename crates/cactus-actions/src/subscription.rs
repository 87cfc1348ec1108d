// SPDX-License-Identifier: MIT OR Apache-2.0
//! `create-subscription`, `delete-subscription`, `notifications`.

use crate::context::{ActionContext, ActionResult};
use crate::error::ActionError;
use crate::params::{flag, required_str, resource_kind_param};
use cactus_model::payload::subscription::Subscription;
use cactus_model::{ParamMap, ResourceId, ResourceKind, StoredResource};
use reqwest::Method;

/// **create-subscription(sub-id alias, kind)** — subscribe to every
/// currently-stored resource of `kind` via a fresh (or reused) webhook,
/// POSTing to that resource's own subscription-list (falling back to its
/// owning end device's subscription-list for resources that have none of
/// their own, e.g. DERControl).
pub async fn create_subscription(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let alias = required_str(params, step_id, "sub-id")?.to_string();
    let kind = resource_kind_param(step_id, "kind", required_str(params, step_id, "kind")?)?;

    let targets: Vec<(ResourceId, String)> = ctx
        .store
        .get_by_kind(kind)
        .into_iter()
        .map(|r| (r.id.clone(), r.href().to_string()))
        .collect();

    let mut subscribed = 0u32;
    for (id, href) in targets {
        let sub_list_href = ctx
            .store
            .get_by_id(&id)
            .and_then(|r| r.child_links.get(&ResourceKind::SubscriptionList).cloned())
            .or_else(|| {
                ctx.store
                    .get_ancestor_of(&id, ResourceKind::EndDevice)
                    .and_then(|edev| edev.child_links.get(&ResourceKind::SubscriptionList).cloned())
            });
        let Some(sub_list_href) = sub_list_href else {
            tracing::warn!(target: "cactus.actions", href = %href, "create-subscription: no subscription-list reachable for this resource, skipping");
            continue;
        };

        let webhook_uri = ctx.notifications.fetch_webhook(&alias, kind, &href).await?;
        let payload = Subscription::for_resource(webhook_uri, href.clone());

        let outcome = ctx
            .client
            .submit_and_refetch(ResourceKind::Subscription, ctx.request_ctx, Method::POST, &sub_list_href, &payload, false)
            .await?;

        let Some(sub_href) = outcome.refetched.href.clone() else { continue };
        let sub_id = ResourceId::new(ResourceKind::Subscription, &sub_href, Some(&id));
        ctx.store.upsert(StoredResource {
            id: sub_id.clone(),
            created_at: ctx.now,
            payload: cactus_model::payload::Payload::Subscription(outcome.refetched),
            child_links: Default::default(),
            member_of_list: Some(ResourceKind::SubscriptionList),
        });
        ctx.store.annotations_mut(&sub_id).set_alias(alias.clone());
        subscribed += 1;
    }

    Ok(ActionResult::done_with(format!("create-subscription({alias}): {subscribed} resource(s) subscribed")))
}

/// **delete-subscription(sub-id alias)** — delete every Subscription
/// aliased `alias` and forget it.
pub async fn delete_subscription(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let alias = required_str(params, step_id, "sub-id")?.to_string();

    let ids: Vec<ResourceId> = ctx
        .store
        .get_by_kind(ResourceKind::Subscription)
        .into_iter()
        .filter(|r| ctx.store.annotations(&r.id).and_then(|a| a.alias.as_deref()) == Some(alias.as_str()))
        .map(|r| r.id.clone())
        .collect();

    let mut deleted = 0u32;
    for id in ids {
        ctx.client.delete_and_check(ctx.request_ctx, id.href()).await?;
        ctx.store.delete(&id);
        deleted += 1;
    }

    Ok(ActionResult::done_with(format!("delete-subscription({alias}): {deleted} deleted")))
}

/// **notifications(sub-id alias, collect?, disable?)**.
pub async fn notifications(params: &ParamMap, step_id: &str, ctx: &mut ActionContext<'_>) -> Result<ActionResult, ActionError> {
    let alias = required_str(params, step_id, "sub-id")?.to_string();
    let collect = flag(params, "collect");
    let disable = params.get("disable").and_then(cactus_model::ParamValue::as_bool);

    let mut description = String::new();

    if let Some(disabled) = disable {
        ctx.notifications.update_enabled(&alias, !disabled).await?;
        description.push_str(&format!("enabled={} ", !disabled));
    }

    if collect {
        let outcome = ctx.notifications.collect(&alias, ctx.store).await?;
        description.push_str(&format!("collected {} notification(s), {} warning(s)", outcome.notifications, outcome.warnings.len()));
        if !outcome.warnings.is_empty() {
            return Ok(ActionResult::done_with(format!("{description}: {}", outcome.warnings.join("; "))));
        }
    }

    Ok(ActionResult::done_with(description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cactus_model::payload::device_capability::Link;
    use cactus_model::payload::end_device::{DeviceCategory, EndDevice};
    use cactus_model::payload::Payload;
    use cactus_notify::NotificationsContext;
    use cactus_protocol::{ProtocolClient, RequestContext};
    use cactus_store::ResourceStore;
    use std::collections::BTreeMap;
    use std::time::{Duration, SystemTime};

    fn dummy_client_config() -> cactus_model::ClientConfig {
        cactus_model::ClientConfig {
            id: "client-1".into(),
            role: cactus_model::Role::Device,
            cert_path: "cert.pem".into(),
            key_path: "key.pem".into(),
            lfdi: "AB".repeat(20),
            pen: 1,
            pin: 1234,
            nominal_max_watts: 5000,
            user_agent: None,
        }
    }

    fn seed_own_edev(store: &mut ResourceStore, client_config: &cactus_model::ClientConfig) {
        let edev_id = ResourceId::root(ResourceKind::EndDevice, "/edev/1");
        store.append(StoredResource {
            id: edev_id,
            created_at: SystemTime::now(),
            payload: Payload::EndDevice(EndDevice {
                href: Some("/edev/1".into()),
                l_fdi: client_config.lfdi.clone(),
                s_fdi: cactus_util::convert_lfdi_to_sfdi(&client_config.lfdi).unwrap(),
                device_category: DeviceCategory::Photovoltaic.hex_code().to_string(),
                enabled: true,
                post_rate: Some(60),
                connection_point_link: None,
                registration_link: None,
                function_set_assignments_list_link: None,
                der_list_link: None,
                subscription_list_link: Some(Link::new("/edev/1/sub")),
            }),
            child_links: BTreeMap::from([(ResourceKind::SubscriptionList, "/edev/1/sub".to_string())]),
            member_of_list: None,
        });
    }

    #[tokio::test]
    async fn create_subscription_posts_one_per_target_and_aliases_it() {
        let server = wiremock::MockServer::start().await;
        let client_config = dummy_client_config();

        let stored_sub = Subscription::for_resource("https://collector.example/hook/ep-1", "/edev/1");
        let mut stored_sub_with_href = stored_sub.clone();
        stored_sub_with_href.href = Some("/edev/1/sub/1".into());
        let body = quick_xml::se::to_string(&stored_sub_with_href).unwrap();

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/edev/1/sub"))
            .respond_with(wiremock::ResponseTemplate::new(201).insert_header("Location", "/edev/1/sub/1"))
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/edev/1/sub/1"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/endpoint-list"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "endpoint_id": "ep-1",
                "fully_qualified_webhook_uri": "https://collector.example/hook/ep-1",
            })))
            .mount(&server)
            .await;

        let client = ProtocolClient::unauthenticated(&server.uri(), Duration::from_millis(1));
        let req_ctx = RequestContext { client_alias: "client-1".into(), step_id: "s1".into() };
        let mut store = ResourceStore::new();
        seed_own_edev(&mut store, &client_config);
        let mut notifications_ctx = NotificationsContext::new(server.uri());
        let mut params = ParamMap::new();
        params.insert("sub-id".into(), cactus_model::ParamValue::String("sub-alias".into()));
        params.insert("kind".into(), cactus_model::ParamValue::String("end-device".into()));

        let mut ctx = ActionContext {
            client: &client,
            device_capability_uri: "/dcap",
            request_ctx: &req_ctx,
            client_config: &client_config,
            store: &mut store,
            notifications: &mut notifications_ctx,
            now: SystemTime::now(),
            repeat_number: 0,
        };

        let result = create_subscription(&params, "s1", &mut ctx).await.unwrap();
        assert!(result.completed);
        assert_eq!(store.get_by_kind(ResourceKind::Subscription).len(), 1);
        let sub = &store.get_by_kind(ResourceKind::Subscription)[0];
        assert!(store.annotations(&sub.id).unwrap().alias.as_deref() == Some("sub-alias"));
    }
}
