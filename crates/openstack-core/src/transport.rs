//! HTTP/JSON transport shared by the service clients.
//!
//! [`ServiceClient`] resolves a service's base endpoint through its
//! [`Authenticator`], attaches `X-Auth-Token`, encodes request bodies, and
//! decodes responses. OpenStack wraps single resources and lists in a one-key
//! object (`{"subnet": {..}}`, `{"subnets": [..]}`); the `*_keyed` helpers
//! add and strip that envelope so resource wrappers deal only in their DTOs.
//!
//! Each call performs exactly one HTTP request. Failures are returned as-is:
//! there is no retry.

use crate::auth::Authenticator;
use crate::client::ClientConfig;
use crate::query::QueryParams;
use crate::request::{check_path_id, ends_with_segment, join_item, join_segments};
use crate::types::{ServiceType, AUTH_TOKEN_HEADER};
use crate::{Error, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

const JSON: &str = "application/json";

/// Authenticated JSON client for one OpenStack service.
#[derive(Clone)]
pub struct ServiceClient {
    http: Client,
    auth: Arc<dyn Authenticator>,
    service: ServiceType,
    endpoint_override: Option<Url>,
    version_segment: Option<&'static str>,
    logging: bool,
}

impl fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClient")
            .field("service", &self.service)
            .field("endpoint_override", &self.endpoint_override)
            .field("version_segment", &self.version_segment)
            .finish_non_exhaustive()
    }
}

impl ServiceClient {
    /// Create a client for `service`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the HTTP client cannot be built.
    pub fn new(
        service: ServiceType,
        auth: Arc<dyn Authenticator>,
        config: &ClientConfig,
        user_agent: &str,
    ) -> Result<Self> {
        let http = config.build_http_client(user_agent)?;
        Ok(Self::from_parts(service, auth, http, config.enable_logging))
    }

    /// Create a client that shares an existing `reqwest` client.
    #[must_use]
    pub fn from_parts(
        service: ServiceType,
        auth: Arc<dyn Authenticator>,
        http: Client,
        logging: bool,
    ) -> Self {
        Self {
            http,
            auth,
            service,
            endpoint_override: None,
            version_segment: None,
            logging,
        }
    }

    /// Use `endpoint` instead of asking the authenticator.
    #[must_use]
    pub fn with_endpoint_override(mut self, endpoint: Url) -> Self {
        self.endpoint_override = Some(endpoint);
        self
    }

    /// Append `segment` (e.g. `v2.0`) to endpoints that do not already end with it.
    #[must_use]
    pub fn with_version_segment(mut self, segment: &'static str) -> Self {
        self.version_segment = Some(segment);
        self
    }

    /// The service this client talks to.
    #[must_use]
    pub const fn service(&self) -> ServiceType {
        self.service
    }

    /// Resolve the base endpoint, including the version segment if configured.
    ///
    /// # Errors
    ///
    /// Propagates endpoint lookup failures from the authenticator.
    pub async fn base_endpoint(&self) -> Result<Url> {
        let endpoint = match &self.endpoint_override {
            Some(url) => url.clone(),
            None => self.auth.endpoint(self.service).await?,
        };

        match self.version_segment {
            Some(segment) if !ends_with_segment(&endpoint, segment) => {
                join_segments(&endpoint, &[segment])
            }
            _ => Ok(endpoint),
        }
    }

    /// Build the URL of a resource path under this service's endpoint.
    ///
    /// # Errors
    ///
    /// Propagates endpoint lookup failures and malformed endpoints.
    pub async fn resource_url(&self, segments: &[&str]) -> Result<Url> {
        join_segments(&self.base_endpoint().await?, segments)
    }

    /// Build the URL of one item: the static `path`, then `id` as a single
    /// encoded segment. The identifier is checked before any endpoint lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for identifiers that cannot be a path
    /// segment, and propagates endpoint lookup failures.
    pub async fn item_url(&self, path: &[&str], id: &str) -> Result<Url> {
        check_path_id(id)?;
        join_item(&self.base_endpoint().await?, path, id)
    }

    /// GET `url` and decode the whole body.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode errors are returned unchanged.
    pub async fn get_json<R>(&self, url: Url, query: &QueryParams) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let bytes = self.execute(Method::GET, url.clone(), query, None).await?;
        decode_body(&url, &bytes)
    }

    /// GET `url` and decode the member named `key`.
    ///
    /// # Errors
    ///
    /// As [`ServiceClient::get_json`]; a missing `key` is a decode error.
    pub async fn get_keyed<R>(&self, url: Url, query: &QueryParams, key: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let value: Value = self.get_json(url.clone(), query).await?;
        unwrap_envelope(&url, value, key)
    }

    /// POST `body` as JSON and decode the whole response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `body` cannot be encoded; otherwise
    /// as [`ServiceClient::get_json`].
    pub async fn post_json<B, R>(&self, url: Url, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(Method::POST, url, body).await
    }

    /// POST `{key: body}` and decode the `key` member of the response.
    ///
    /// # Errors
    ///
    /// As [`ServiceClient::post_json`].
    pub async fn post_keyed<B, R>(&self, url: Url, key: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let value: Value = self.post_json(url.clone(), &wrap_envelope(key, body)?).await?;
        unwrap_envelope(&url, value, key)
    }

    /// PUT `body` as JSON and decode the whole response.
    ///
    /// # Errors
    ///
    /// As [`ServiceClient::post_json`].
    pub async fn put_json<B, R>(&self, url: Url, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(Method::PUT, url, body).await
    }

    /// PUT `{key: body}` and decode the `key` member of the response.
    ///
    /// # Errors
    ///
    /// As [`ServiceClient::post_json`].
    pub async fn put_keyed<B, R>(&self, url: Url, key: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let value: Value = self.put_json(url.clone(), &wrap_envelope(key, body)?).await?;
        unwrap_envelope(&url, value, key)
    }

    /// DELETE `url`, ignoring any response body.
    ///
    /// # Errors
    ///
    /// Transport and status errors are returned unchanged.
    pub async fn delete(&self, url: Url) -> Result<()> {
        self.execute(Method::DELETE, url, &QueryParams::new(), None)
            .await
            .map(|_| ())
    }

    async fn send_json<B, R>(&self, method: Method, url: Url, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).map_err(|err| {
            Error::InvalidRequest(format!("Failed to encode body for `{}`: {err}", url.path()))
        })?;
        let bytes = self
            .execute(method, url.clone(), &QueryParams::new(), Some(payload))
            .await?;
        decode_body(&url, &bytes)
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        query: &QueryParams,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let token = self.auth.token().await?;
        let path = url.path().to_string();

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(AUTH_TOKEN_HEADER, token)
            .header(ACCEPT, JSON);
        if !query.is_empty() {
            request = request.query(query.as_pairs());
        }
        if let Some(payload) = body {
            request = request.header(CONTENT_TYPE, JSON).body(payload);
        }

        if self.logging {
            info!(service = %self.service, %method, path = %path, "OpenStack request");
        }

        let response = request.send().await.map_err(|err| {
            let error = Error::from(err);
            if self.logging && error.should_log() {
                warn!(service = %self.service, %method, path = %path, %error, "request failed");
            }
            error
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| {
            Error::HttpError(format!("Failed to read response body for `{path}`: {err}"))
        })?;

        if self.logging {
            debug!(
                service = %self.service,
                status = status.as_u16(),
                bytes = bytes.len(),
                path = %path,
                "OpenStack response"
            );
        }

        if status.is_success() {
            return Ok(bytes.to_vec());
        }

        let error = status_error(status, &bytes);
        if self.logging && error.should_log() {
            warn!(service = %self.service, %method, path = %path, %error, "request failed");
        }
        Err(error)
    }
}

fn status_error(status: StatusCode, bytes: &[u8]) -> Error {
    Error::status(status.as_u16(), String::from_utf8_lossy(bytes).into_owned())
}

fn decode_body<R>(url: &Url, bytes: &[u8]) -> Result<R>
where
    R: DeserializeOwned,
{
    if bytes.is_empty() {
        serde_json::from_value(Value::Null).map_err(|err| {
            Error::DecodeError(format!("Empty response for `{}`: {err}", url.path()))
        })
    } else {
        serde_json::from_slice(bytes).map_err(|err| {
            Error::DecodeError(format!("Failed to parse response for `{}`: {err}", url.path()))
        })
    }
}

fn wrap_envelope<B>(key: &str, body: &B) -> Result<Value>
where
    B: Serialize + ?Sized,
{
    let inner = serde_json::to_value(body)
        .map_err(|err| Error::InvalidRequest(format!("Failed to encode `{key}`: {err}")))?;
    let mut envelope = serde_json::Map::new();
    envelope.insert(key.to_string(), inner);
    Ok(Value::Object(envelope))
}

fn unwrap_envelope<R>(url: &Url, mut value: Value, key: &str) -> Result<R>
where
    R: DeserializeOwned,
{
    let inner = value
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| {
            Error::DecodeError(format!(
                "Response for `{}` has no `{key}` member",
                url.path()
            ))
        })?;
    serde_json::from_value(inner).map_err(|err| {
        Error::DecodeError(format!(
            "Failed to parse `{key}` in response for `{}`: {err}",
            url.path()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MockAuthenticator, StaticAuthenticator};
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Widget {
        id: String,
        name: String,
    }

    #[derive(Debug, Serialize)]
    struct NewWidget<'a> {
        name: &'a str,
    }

    fn client(server: &MockServer) -> ServiceClient {
        let auth = StaticAuthenticator::new("tok-abc")
            .with_endpoint(ServiceType::Network, format!("{}/", server.uri()))
            .unwrap();
        ServiceClient::new(
            ServiceType::Network,
            Arc::new(auth),
            &ClientConfig::default(),
            "openstack-core/test",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn get_keyed_sends_token_and_unwraps() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widgets/w1"))
            .and(header("X-Auth-Token", "tok-abc"))
            .and(header("Accept", "application/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"widget": {"id": "w1", "name": "first"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let url = client.resource_url(&["widgets", "w1"]).await.unwrap();
        let widget: Widget = client
            .get_keyed(url, &QueryParams::new(), "widget")
            .await
            .unwrap();
        assert_eq!(
            widget,
            Widget {
                id: "w1".into(),
                name: "first".into()
            }
        );
    }

    #[tokio::test]
    async fn get_keyed_passes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widgets"))
            .and(query_param("name", "first"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"widgets": [{"id": "w1", "name": "first"}]})),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        let mut query = QueryParams::new();
        query.push("name", "first");
        let url = client.resource_url(&["widgets"]).await.unwrap();
        let widgets: Vec<Widget> = client.get_keyed(url, &query, "widgets").await.unwrap();
        assert_eq!(widgets.len(), 1);
    }

    #[tokio::test]
    async fn post_keyed_wraps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/widgets"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"widget": {"name": "second"}})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"widget": {"id": "w2", "name": "second"}})),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        let url = client.resource_url(&["widgets"]).await.unwrap();
        let widget: Widget = client
            .post_keyed(url, "widget", &NewWidget { name: "second" })
            .await
            .unwrap();
        assert_eq!(widget.id, "w2");
    }

    #[tokio::test]
    async fn put_keyed_wraps_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/widgets/w2"))
            .and(body_json(json!({"widget": {"name": "renamed"}})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"widget": {"id": "w2", "name": "renamed"}})),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        let url = client.resource_url(&["widgets", "w2"]).await.unwrap();
        let widget: Widget = client
            .put_keyed(url, "widget", &NewWidget { name: "renamed" })
            .await
            .unwrap();
        assert_eq!(widget.name, "renamed");
    }

    #[tokio::test]
    async fn delete_accepts_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/widgets/w2"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let url = client.resource_url(&["widgets", "w2"]).await.unwrap();
        client.delete(url).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_surfaces_code_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widgets/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "NeutronError": {"type": "WidgetNotFound", "message": "Widget missing could not be found.", "detail": ""}
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let url = client.resource_url(&["widgets", "missing"]).await.unwrap();
        let err = client
            .get_keyed::<Widget>(url, &QueryParams::new(), "widget")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert!(err.is_not_found());
        assert_eq!(
            err.fault_message().as_deref(),
            Some("Widget missing could not be found.")
        );
    }

    #[tokio::test]
    async fn server_error_does_not_decode_partial_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widgets/w1"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"widget": {"id": "w1", "name": "partial"}})),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        let url = client.resource_url(&["widgets", "w1"]).await.unwrap();
        let err = client
            .get_keyed::<Widget>(url, &QueryParams::new(), "widget")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn malformed_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widgets"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"widgets\": [{"))
            .mount(&server)
            .await;

        let client = client(&server);
        let url = client.resource_url(&["widgets"]).await.unwrap();
        let err = client
            .get_keyed::<Vec<Widget>>(url, &QueryParams::new(), "widgets")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DecodeError(_)));
    }

    #[tokio::test]
    async fn unexpected_shape_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widgets/w1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"gadget": {}})))
            .mount(&server)
            .await;

        let client = client(&server);
        let url = client.resource_url(&["widgets", "w1"]).await.unwrap();
        let err = client
            .get_keyed::<Widget>(url.clone(), &QueryParams::new(), "widget")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DecodeError(msg) if msg.contains("`widget`")));

        let err = client
            .get_json::<Widget>(url, &QueryParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DecodeError(_)));
    }

    #[tokio::test]
    async fn empty_body_is_decode_error_for_typed_target() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/widgets/w1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client(&server);
        let url = client.resource_url(&["widgets", "w1"]).await.unwrap();
        let err = client
            .get_json::<Widget>(url, &QueryParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DecodeError(_)));
    }

    #[tokio::test]
    async fn version_segment_added_once() {
        let server = MockServer::start().await;
        let client = client(&server).with_version_segment("v2.0");
        let url = client.resource_url(&["subnets"]).await.unwrap();
        assert_eq!(url.as_str(), format!("{}/v2.0/subnets", server.uri()));

        let versioned = Url::parse(&format!("{}/v2.0", server.uri())).unwrap();
        let client = client.with_endpoint_override(versioned);
        let url = client.resource_url(&["subnets"]).await.unwrap();
        assert_eq!(url.as_str(), format!("{}/v2.0/subnets", server.uri()));
    }

    #[tokio::test]
    async fn authenticator_failure_is_propagated() {
        let mut auth = MockAuthenticator::new();
        auth.expect_endpoint()
            .returning(|_| Ok(Url::parse("http://127.0.0.1:9/").unwrap()));
        auth.expect_token()
            .returning(|| Err(Error::AuthenticationFailed("expired".into())));

        let client = ServiceClient::new(
            ServiceType::Compute,
            Arc::new(auth),
            &ClientConfig::default(),
            "openstack-core/test",
        )
        .unwrap();
        let url = client.resource_url(&["servers"]).await.unwrap();
        let err = client
            .get_json::<Value>(url, &QueryParams::new())
            .await
            .unwrap_err();
        assert_eq!(err, Error::AuthenticationFailed("expired".into()));
    }

    #[tokio::test]
    async fn item_url_encodes_id_as_one_segment() {
        let server = MockServer::start().await;
        let client = client(&server);

        let url = client.item_url(&["widgets"], "a/b").await.unwrap();
        assert_eq!(url.path(), "/widgets/a%2Fb");
    }

    #[tokio::test]
    async fn item_url_rejects_dot_ids_before_endpoint_lookup() {
        let mut auth = MockAuthenticator::new();
        auth.expect_endpoint().never();
        auth.expect_token().never();

        let client = ServiceClient::new(
            ServiceType::Compute,
            Arc::new(auth),
            &ClientConfig::default(),
            "openstack-core/test",
        )
        .unwrap();
        for id in ["", ".", ".."] {
            let err = client.item_url(&["os-keypairs"], id).await.unwrap_err();
            assert!(matches!(err, Error::InvalidRequest(_)), "{id:?}: {err:?}");
        }
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        let auth = StaticAuthenticator::new("tok")
            .with_endpoint(ServiceType::Compute, "http://127.0.0.1:1/")
            .unwrap();
        let client = ServiceClient::new(
            ServiceType::Compute,
            Arc::new(auth),
            &ClientConfig::default().with_logging(false),
            "openstack-core/test",
        )
        .unwrap();
        let url = client.resource_url(&["servers"]).await.unwrap();
        let err = client
            .get_json::<Value>(url, &QueryParams::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ServiceUnavailable(_) | Error::HttpError(_) | Error::Timeout(_)
        ));
        assert!(err.status_code().is_none());
    }
}
