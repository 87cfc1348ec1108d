// SPDX-License-Identifier: MIT OR Apache-2.0
//! The mutually-authenticated XML/HTTP protocol client.

use crate::retry::delay_for_attempt;
use crate::tracker::{RequestDescriptor, RequestObserver, RequestRecord, SharedObserver, TracingObserver};
use crate::validate::{BodyValidator, NoopValidator};
use cactus_error::RequestKind;
use cactus_model::payload::error::ErrorPayload;
use cactus_model::payload::list::ListEnvelope;
use cactus_model::{ClientConfig, ResourceKind, ServerConfig};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Media type used for every protocol request/response body.
pub const PROTOCOL_MIME: &str = "application/sep+xml";

/// Per-call context threaded through every client method, identifying the
/// owning client and step for the requests timeline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Alias of the client issuing the request.
    pub client_alias: String,
    /// Owning step id.
    pub step_id: String,
}

/// A bare HTTP response, before any payload parsing.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Status code received.
    pub status: StatusCode,
    /// Value of the `Location` response header, if present.
    pub location: Option<String>,
    /// Raw response body.
    pub body: String,
}

impl RawResponse {
    /// `true` iff `status` is in `4xx`.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }
}

/// Either a parsed `Error` payload or a definitely-empty list, the outcome
/// of `client-error-or-empty-list`.
#[derive(Debug, Clone)]
pub enum ClientErrorOrEmptyList<T> {
    /// A 4xx response that parsed as the protocol's Error payload.
    Error(ErrorPayload),
    /// A 2xx response whose list body reported zero items and zero total.
    EmptyList(ListEnvelope<T>),
}

/// Outcome of `submit-and-refetch`.
#[derive(Debug, Clone)]
pub struct SubmitOutcome<T> {
    /// The payload as read back from the refetch.
    pub refetched: T,
    /// A tolerance-filtered divergence description, if the refetched
    /// payload differed from what was submitted outside of tolerance.
    pub warning: Option<String>,
}

/// The protocol client for one test client's identity.
pub struct ProtocolClient {
    http: reqwest::Client,
    authority: String,
    user_agent: Option<String>,
    refetch_delay: Duration,
    validator: Arc<dyn BodyValidator>,
    observer: SharedObserver,
}

impl ProtocolClient {
    /// Build a client authenticated as `client` against `server`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestKind::Transport`] if the client's certificate/key
    /// cannot be read or parsed, or if the underlying TLS client cannot be
    /// constructed.
    pub fn new(server: &ServerConfig, client: &ClientConfig) -> Result<Self, RequestKind> {
        Self::with_validator_and_observer(server, client, Arc::new(NoopValidator), Arc::new(TracingObserver))
    }

    /// Like [`Self::new`], but with an explicit validator and observer
    /// (used by discovery/engine to wire in the shared response tracker).
    pub fn with_validator_and_observer(
        server: &ServerConfig,
        client: &ClientConfig,
        validator: Arc<dyn BodyValidator>,
        observer: SharedObserver,
    ) -> Result<Self, RequestKind> {
        let identity = load_identity(&client.cert_path, &client.key_path)?;
        let mut builder = reqwest::Client::builder()
            .use_native_tls()
            .identity(identity)
            .danger_accept_invalid_hostnames(!server.verify_hostname);

        if let Some(anchor) = &server.trust_anchor_path {
            let pem = std::fs::read(anchor).map_err(|e| RequestKind::Transport {
                source: format!("reading trust anchor {}: {e}", anchor.display()),
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| RequestKind::Transport {
                source: format!("parsing trust anchor {}: {e}", anchor.display()),
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder.build().map_err(|e| RequestKind::Transport { source: e.to_string() })?;

        Ok(Self {
            http,
            authority: authority_of(&server.device_capability_uri),
            user_agent: client.user_agent.clone(),
            refetch_delay: server.refetch_delay,
            validator,
            observer,
        })
    }

    fn absolute(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{path}", self.authority)
        }
    }

    /// **request**: issue a single logical request, retrying on
    /// HTTP 429 per the fixed rate-limit schedule.
    ///
    /// # Errors
    ///
    /// Returns [`RequestKind::Transport`] on a connection/IO failure.
    pub async fn request(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: Option<String>,
        validate_as: Option<ResourceKind>,
    ) -> Result<RawResponse, RequestKind> {
        let descriptor = RequestDescriptor {
            client_alias: ctx.client_alias.clone(),
            step_id: ctx.step_id.clone(),
            method: method.to_string(),
            path: path.to_string(),
        };

        let mut attempt: u32 = 0;
        loop {
            self.observer.before_request(&descriptor, attempt);
            let started = Instant::now();

            let mut req = self
                .http
                .request(method.clone(), self.absolute(path))
                .header("Accept", PROTOCOL_MIME);
            if let Some(ua) = &self.user_agent {
                req = req.header("User-Agent", ua.as_str());
            }
            if let Some(b) = &body {
                req = req.header("Content-Type", PROTOCOL_MIME).body(b.clone());
            }

            let outcome = req.send().await;
            let duration = started.elapsed();

            let response = match outcome {
                Ok(r) => r,
                Err(e) => {
                    self.observer.after_request(RequestRecord {
                        descriptor: descriptor.clone(),
                        attempt,
                        status: None,
                        request_body: body.clone(),
                        response_body: None,
                        validation: None,
                        duration,
                    });
                    return Err(RequestKind::Transport { source: e.to_string() });
                }
            };

            let status = response.status();
            let location = response
                .headers()
                .get("Location")
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string);
            let response_body = response.text().await.unwrap_or_default();

            let validation = validate_as.and_then(|kind| {
                if response_body.is_empty() {
                    None
                } else {
                    Some(self.validator.validate(kind, &response_body))
                }
            });

            self.observer.after_request(RequestRecord {
                descriptor: descriptor.clone(),
                attempt,
                status: Some(status.as_u16()),
                request_body: body.clone(),
                response_body: Some(response_body.clone()),
                validation,
                duration,
            });

            if status == StatusCode::TOO_MANY_REQUESTS {
                match delay_for_attempt(attempt as usize) {
                    Some(delay) => {
                        tracing::warn!(
                            target: "cactus.protocol",
                            path,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "rate limited, backing off"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    None => {
                        return Ok(RawResponse { status, location, body: response_body });
                    }
                }
            }

            return Ok(RawResponse { status, location, body: response_body });
        }
    }

    /// **get**.
    ///
    /// # Errors
    ///
    /// Returns [`RequestKind::UnexpectedStatus`] on a non-2xx response, or
    /// [`RequestKind::ParseFailure`] if the body does not parse as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        ctx: &RequestContext,
        href: &str,
    ) -> Result<T, RequestKind> {
        let raw = self.request(ctx, Method::GET, href, None, Some(kind)).await?;
        if !raw.status.is_success() {
            return Err(RequestKind::UnexpectedStatus {
                method: "GET".into(),
                path: href.into(),
                status: raw.status.as_u16(),
            });
        }
        quick_xml::de::from_str(&raw.body).map_err(|e| RequestKind::ParseFailure {
            kind: format!("{kind:?}"),
            reason: e.to_string(),
        })
    }

    /// **client-error-request**.
    ///
    /// # Errors
    ///
    /// Returns [`RequestKind::UnexpectedStatus`] unless the response is
    /// `4xx`, or [`RequestKind::ParseFailure`] if the body does not parse
    /// as the protocol's `Error` payload.
    pub async fn client_error_request(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<ErrorPayload, RequestKind> {
        let method_name = method.to_string();
        let raw = self.request(ctx, method, path, body, None).await?;
        if !raw.is_client_error() {
            return Err(RequestKind::UnexpectedStatus {
                method: method_name,
                path: path.into(),
                status: raw.status.as_u16(),
            });
        }
        quick_xml::de::from_str(&raw.body).map_err(|e| RequestKind::ParseFailure {
            kind: "Error".into(),
            reason: e.to_string(),
        })
    }

    /// **client-error-or-empty-list**.
    ///
    /// # Errors
    ///
    /// Returns [`RequestKind::UnexpectedStatus`] when the response is
    /// neither a 4xx `Error` payload nor a 2xx definitely-empty list.
    pub async fn client_error_or_empty_list<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<ClientErrorOrEmptyList<T>, RequestKind> {
        let method_name = method.to_string();
        let raw = self.request(ctx, method, path, body, Some(kind)).await?;

        if raw.is_client_error() {
            let error: ErrorPayload = quick_xml::de::from_str(&raw.body).map_err(|e| RequestKind::ParseFailure {
                kind: "Error".into(),
                reason: e.to_string(),
            })?;
            return Ok(ClientErrorOrEmptyList::Error(error));
        }

        if raw.status.is_success() {
            if let Ok(list) = quick_xml::de::from_str::<ListEnvelope<T>>(&raw.body) {
                if list.is_definitely_empty() {
                    return Ok(ClientErrorOrEmptyList::EmptyList(list));
                }
            }
        }

        Err(RequestKind::UnexpectedStatus {
            method: method_name,
            path: path.into(),
            status: raw.status.as_u16(),
        })
    }

    /// **submit-and-refetch**.
    ///
    /// # Errors
    ///
    /// Returns [`RequestKind::UnexpectedStatus`] if the write is not 2xx,
    /// [`RequestKind::MissingLocation`] if a `Location` header is required
    /// but absent, or any error from the follow-up [`Self::get`].
    pub async fn submit_and_refetch<T: Serialize + DeserializeOwned>(
        &self,
        kind: ResourceKind,
        ctx: &RequestContext,
        method: Method,
        href: &str,
        payload: &T,
        no_location_header: bool,
    ) -> Result<SubmitOutcome<T>, RequestKind> {
        let method_name = method.to_string();
        let xml = quick_xml::se::to_string(payload).map_err(|e| RequestKind::ParseFailure {
            kind: format!("{kind:?}"),
            reason: e.to_string(),
        })?;

        let raw = self.request(ctx, method, href, Some(xml), Some(kind)).await?;
        if !raw.status.is_success() {
            return Err(RequestKind::UnexpectedStatus {
                method: method_name,
                path: href.into(),
                status: raw.status.as_u16(),
            });
        }

        let refetch_uri = if no_location_header {
            href.to_string()
        } else {
            raw.location.clone().ok_or_else(|| RequestKind::MissingLocation { href: href.into() })?
        };

        tokio::time::sleep(self.refetch_delay).await;
        let refetched: T = self.get(kind, ctx, &refetch_uri).await?;

        let submitted_json = serde_json::to_value(payload).unwrap_or_default();
        let refetched_json = serde_json::to_value(&refetched).unwrap_or_default();
        let warning = cactus_util::property_diff(&submitted_json, &refetched_json);

        Ok(SubmitOutcome { refetched, warning })
    }

    /// **delete-and-check**.
    ///
    /// # Errors
    ///
    /// Returns [`RequestKind::UnexpectedStatus`] if the delete itself is
    /// not 2xx, or [`RequestKind::UnexpectedPostDeleteStatus`] if the
    /// follow-up GET returns anything other than 404, 401, or 403.
    pub async fn delete_and_check(&self, ctx: &RequestContext, href: &str) -> Result<(), RequestKind> {
        let raw = self.request(ctx, Method::DELETE, href, None, None).await?;
        if !raw.status.is_success() {
            return Err(RequestKind::UnexpectedStatus {
                method: "DELETE".into(),
                path: href.into(),
                status: raw.status.as_u16(),
            });
        }

        let followup = self.request(ctx, Method::GET, href, None, None).await?;
        match followup.status.as_u16() {
            404 | 401 | 403 => Ok(()),
            other => Err(RequestKind::UnexpectedPostDeleteStatus { href: href.into(), status: other }),
        }
    }

    /// Build a client with no TLS identity, pointed at a plaintext
    /// `base_url`. For use against test doubles (wiremock and similar) that
    /// don't speak mTLS; never for a real CSIP-Aus server.
    pub fn unauthenticated(base_url: &str, refetch_delay: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            authority: base_url.to_string(),
            user_agent: None,
            refetch_delay,
            validator: Arc::new(NoopValidator),
            observer: Arc::new(TracingObserver),
        }
    }
}

fn load_identity(cert_path: &Path, key_path: &Path) -> Result<reqwest::Identity, RequestKind> {
    let mut combined = std::fs::read(cert_path).map_err(|e| RequestKind::Transport {
        source: format!("reading certificate {}: {e}", cert_path.display()),
    })?;
    let mut key = std::fs::read(key_path).map_err(|e| RequestKind::Transport {
        source: format!("reading key {}: {e}", key_path.display()),
    })?;
    combined.append(&mut key);
    reqwest::Identity::from_pem(&combined).map_err(|e| RequestKind::Transport {
        source: format!("parsing client identity: {e}"),
    })
}

fn authority_of(uri: &str) -> String {
    let Some(scheme_end) = uri.find("://").map(|i| i + 3) else {
        return uri.to_string();
    };
    match uri[scheme_end..].find('/') {
        Some(i) => uri[..scheme_end + i].to_string(),
        None => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_of_strips_path() {
        assert_eq!(authority_of("https://host:8443/dcap"), "https://host:8443");
        assert_eq!(authority_of("https://host:8443"), "https://host:8443");
    }

    fn sample_end_device(post_rate: u32) -> cactus_model::payload::end_device::EndDevice {
        cactus_model::payload::end_device::EndDevice {
            href: Some("/edev/1".into()),
            l_fdi: "A".repeat(40),
            s_fdi: 123456789,
            device_category: "0400".into(),
            enabled: true,
            post_rate: Some(post_rate),
            connection_point_link: None,
            registration_link: None,
            function_set_assignments_list_link: None,
            der_list_link: None,
            subscription_list_link: None,
        }
    }

    #[tokio::test]
    async fn rate_limit_retry_then_succeeds() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let body = quick_xml::se::to_string(&sample_end_device(60)).unwrap();

        Mock::given(method("GET"))
            .and(path("/edev/1"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/edev/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = ProtocolClient::unauthenticated(&server.uri(), Duration::from_millis(1));
        let ctx = RequestContext { client_alias: "client-1".into(), step_id: "s1".into() };
        let device: cactus_model::payload::end_device::EndDevice =
            client.get(ResourceKind::EndDevice, &ctx, "/edev/1").await.unwrap();
        assert_eq!(device.post_rate, Some(60));
    }

    #[tokio::test]
    async fn submit_and_refetch_tolerates_post_rate_override() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let refetched_body = quick_xml::se::to_string(&sample_end_device(30)).unwrap();

        Mock::given(method("POST"))
            .and(path("/edev"))
            .respond_with(ResponseTemplate::new(201).insert_header("Location", "/edev/1"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/edev/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(refetched_body))
            .mount(&server)
            .await;

        let client = ProtocolClient::unauthenticated(&server.uri(), Duration::from_millis(1));
        let ctx = RequestContext { client_alias: "client-1".into(), step_id: "s1".into() };
        let submitted = sample_end_device(60);
        let outcome = client
            .submit_and_refetch(ResourceKind::EndDevice, &ctx, Method::POST, "/edev", &submitted, false)
            .await
            .unwrap();

        assert_eq!(outcome.refetched.post_rate, Some(30));
        assert_eq!(outcome.warning, None);
    }
}
