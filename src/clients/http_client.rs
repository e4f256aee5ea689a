//! HTTP client for GitLab API communication.
//!
//! This module provides the [`Client`] type: it authenticates requests,
//! issues them against the configured endpoint and turns responses into a
//! [`ResponseBody`] or an [`HttpError`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::clients::errors::{HttpError, HttpResponseError, ResponseErrorKind};
use crate::clients::http_request::{HttpMethod, RequestOptions};
use crate::clients::http_response::HttpResponse;
use crate::config::{Endpoint, GitlabConfig, PrivateToken};
use crate::error::ConfigError;
use crate::rest::{PageFetcher, ResponseBody};

/// Request path that is sent without authentication.
pub const SESSION_PATH: &str = "/session";

/// Header carrying short personal access tokens.
pub const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Async client for the GitLab REST API.
///
/// The client handles:
/// - Endpoint and credential checks before any network call
/// - Default headers (`User-Agent`, `Accept: application/json`) plus configured extras
/// - Token header selection (`PRIVATE-TOKEN` or `Authorization: Bearer`)
/// - The default `sudo` query parameter
/// - Status mapping and body classification via [`validate`](Self::validate)
///
/// # Thread Safety
///
/// `Client` is `Send + Sync` and cheap to clone. Collections returned from
/// list endpoints hold a clone to fetch further pages.
///
/// # Example
///
/// ```rust,ignore
/// use gitlab_api::{Client, Endpoint, GitlabConfig, PrivateToken, RequestOptions};
///
/// let config = GitlabConfig::builder()
///     .endpoint(Endpoint::new("https://gitlab.example.com/api/v4")?)
///     .private_token(PrivateToken::new("glpat-xxxxxxxxxxxx")?)
///     .build()?;
/// let client = Client::new(&config)?;
///
/// let user = client.get("/user", RequestOptions::new()).await?;
/// if let Some(user) = user.as_record() {
///     println!("logged in as {}", user["username"].as_str().unwrap_or_default());
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Base URL every request path is appended to.
    endpoint: Endpoint,
    /// Token used for every request except [`SESSION_PATH`].
    private_token: Option<PrivateToken>,
    /// Headers sent with every request, before per-request headers.
    default_headers: HashMap<String, String>,
    /// Default `sudo` query parameter.
    sudo: Option<String>,
}

// Verify Client is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Client>();
};

impl Client {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::MissingCredentials`] if no endpoint is
    /// configured, or [`HttpError::Network`] if the transport cannot be built.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gitlab_api::{Client, Endpoint, GitlabConfig};
    ///
    /// let config = GitlabConfig::builder()
    ///     .endpoint(Endpoint::new("https://gitlab.example.com/api/v4").unwrap())
    ///     .build()
    ///     .unwrap();
    /// let client = Client::new(&config).unwrap();
    /// assert_eq!(client.endpoint().as_ref(), "https://gitlab.example.com/api/v4");
    /// ```
    pub fn new(config: &GitlabConfig) -> Result<Self, HttpError> {
        let endpoint = config
            .endpoint()
            .cloned()
            .ok_or(HttpError::MissingCredentials {
                reason: "no endpoint configured",
            })?;

        let mut default_headers = config.transport().extra_headers.clone();
        default_headers.insert("User-Agent".to_string(), config.user_agent().to_string());
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.transport().timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
            private_token: config.private_token().cloned(),
            default_headers,
            sudo: None,
        }
        .with_sudo(config.sudo().map(ToString::to_string)))
    }

    /// Replaces the default `sudo` query parameter; `None` removes it.
    #[must_use]
    pub fn with_sudo(mut self, sudo: Option<String>) -> Self {
        self.sudo = sudo.filter(|s| !s.is_empty());
        self
    }

    /// Returns the endpoint requests are sent to.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the default `sudo` user, if any.
    #[must_use]
    pub fn sudo(&self) -> Option<&str> {
        self.sudo.as_deref()
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<ResponseBody, HttpError> {
        self.request(HttpMethod::Get, path, options).await
    }

    /// Sends a POST request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post(&self, path: &str, options: RequestOptions) -> Result<ResponseBody, HttpError> {
        self.request(HttpMethod::Post, path, options).await
    }

    /// Sends a PUT request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn put(&self, path: &str, options: RequestOptions) -> Result<ResponseBody, HttpError> {
        self.request(HttpMethod::Put, path, options).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn delete(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseBody, HttpError> {
        self.request(HttpMethod::Delete, path, options).await
    }

    /// Sends a request to `endpoint + path` and validates the response.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - A token is needed but not configured (`MissingCredentials`, before any I/O)
    /// - A header name or value is invalid (`Config`)
    /// - The transport fails (`Network`)
    /// - The status is a mapped failure (`Response`)
    /// - The body is not valid JSON (`Parsing`)
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseBody, HttpError> {
        let auth = self.authorization_header(path)?;

        let mut options = options.with_default_headers(&self.default_headers);
        if let Some(sudo) = &self.sudo {
            if !path_has_param(path, "sudo") {
                options = options.with_default_param("sudo", sudo);
            }
        }

        let mut headers = HeaderMap::new();
        for (name, value) in options.headers.iter().chain(auth.iter().map(|(n, v)| (n, v))) {
            let (name, value) = header_pair(name, value)?;
            headers.insert(name, value);
        }

        let url = self.endpoint.join(path);
        tracing::debug!(method = %method, url = %url, "Sending GitLab API request");

        let mut req_builder = self
            .client
            .request(method.as_reqwest(), &url)
            .headers(headers);
        if !options.query.is_empty() {
            req_builder = req_builder.query(&options.query);
        }
        if let Some(body) = &options.body {
            req_builder = req_builder.json(body);
        }

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let request_uri = res.url().to_string();
        let body = res.text().await?;

        self.validate(method, &request_uri, HttpResponse::new(code, res_headers, body))
    }

    /// Returns the authentication header for a request to `path`.
    ///
    /// Requests to [`SESSION_PATH`] carry no authentication. Tokens of up to
    /// 20 characters are sent as `PRIVATE-TOKEN`, longer ones as a bearer
    /// token.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::MissingCredentials`] if a token is needed but
    /// none is configured.
    pub fn authorization_header(
        &self,
        path: &str,
    ) -> Result<Option<(String, String)>, HttpError> {
        if path == SESSION_PATH {
            return Ok(None);
        }
        let token = self
            .private_token
            .as_ref()
            .ok_or(HttpError::MissingCredentials {
                reason: "no private token configured",
            })?;

        if token.is_bearer() {
            Ok(Some((
                "Authorization".to_string(),
                format!("Bearer {}", token.as_ref()),
            )))
        } else {
            Ok(Some((
                PRIVATE_TOKEN_HEADER.to_string(),
                token.as_ref().to_string(),
            )))
        }
    }

    /// Maps a raw response to a [`ResponseBody`] or an error.
    ///
    /// Mapped failure statuses become [`HttpError::Response`]; every other
    /// status is decoded. JSON arrays get this client and the response
    /// headers attached so they can be paginated.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Response`] for a mapped status and
    /// [`HttpError::Parsing`] for a body that is not valid JSON.
    pub fn validate(
        &self,
        method: HttpMethod,
        request_uri: &str,
        response: HttpResponse,
    ) -> Result<ResponseBody, HttpError> {
        if let Some(kind) = ResponseErrorKind::from_status(response.code) {
            return Err(HttpResponseError::new(kind, method, request_uri, response).into());
        }

        let mut body = ResponseBody::from_decoded(response.json()?);
        if let ResponseBody::Collection(collection) = &mut body {
            collection.set_client(Arc::new(self.clone()));
            collection.attach_headers(&response.headers);
        }
        Ok(body)
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(headers: &HeaderMap) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

#[async_trait]
impl PageFetcher for Client {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn fetch_page(&self, path: &str) -> Result<ResponseBody, HttpError> {
        self.get(path, RequestOptions::new()).await
    }
}

/// Returns `true` if the query part of `path` already sets `key`.
fn path_has_param(path: &str, key: &str) -> bool {
    path.split_once('?').is_some_and(|(_, query)| {
        query
            .split('&')
            .any(|pair| pair.split_once('=').map_or(pair, |(name, _)| name) == key)
    })
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ConfigError> {
    let invalid = || ConfigError::InvalidHeader {
        name: name.to_string(),
    };
    let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
    let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GitlabConfigBuilder;

    const ENDPOINT: &str = "https://gitlab.example.com/api/v4";

    fn builder() -> GitlabConfigBuilder {
        GitlabConfig::builder().endpoint(Endpoint::new(ENDPOINT).unwrap())
    }

    fn client_with_token(token: &str) -> Client {
        let config = builder()
            .private_token(PrivateToken::new(token).unwrap())
            .build()
            .unwrap();
        Client::new(&config).unwrap()
    }

    fn response(code: u16, body: &str) -> HttpResponse {
        HttpResponse::new(code, HashMap::new(), body.to_string())
    }

    #[test]
    fn test_new_without_endpoint_fails() {
        let config = GitlabConfig::builder().build().unwrap();
        let result = Client::new(&config);
        assert!(matches!(
            result,
            Err(HttpError::MissingCredentials { .. })
        ));
    }

    #[test]
    fn test_short_token_uses_private_token_header() {
        let client = client_with_token("abcdefghijklmnopqrst");
        let header = client.authorization_header("/projects").unwrap();
        assert_eq!(
            header,
            Some((
                "PRIVATE-TOKEN".to_string(),
                "abcdefghijklmnopqrst".to_string()
            ))
        );
    }

    #[test]
    fn test_long_token_uses_bearer_header() {
        let client = client_with_token("abcdefghijklmnopqrstu");
        let header = client.authorization_header("/projects").unwrap();
        assert_eq!(
            header,
            Some((
                "Authorization".to_string(),
                "Bearer abcdefghijklmnopqrstu".to_string()
            ))
        );
    }

    #[test]
    fn test_session_path_needs_no_token() {
        let client = Client::new(&builder().build().unwrap()).unwrap();
        assert_eq!(client.authorization_header("/session").unwrap(), None);
    }

    #[test]
    fn test_missing_token_fails() {
        let client = Client::new(&builder().build().unwrap()).unwrap();
        let result = client.authorization_header("/projects");
        assert!(matches!(
            result,
            Err(HttpError::MissingCredentials { .. })
        ));
    }

    #[test]
    fn test_default_headers() {
        let config = builder().header("X-Trace", "1").build().unwrap();
        let client = Client::new(&config).unwrap();

        assert_eq!(
            client.default_headers().get("Accept"),
            Some(&"application/json".to_string())
        );
        assert!(client
            .default_headers()
            .get("User-Agent")
            .unwrap()
            .starts_with("Gitlab Rust Client v"));
        assert_eq!(client.default_headers().get("X-Trace"), Some(&"1".to_string()));
    }

    #[test]
    fn test_sudo_from_config_and_override() {
        let config = builder().sudo("root").build().unwrap();
        let client = Client::new(&config).unwrap();
        assert_eq!(client.sudo(), Some("root"));

        let client = client.with_sudo(None);
        assert_eq!(client.sudo(), None);

        let client = client.with_sudo(Some("alice".to_string()));
        assert_eq!(client.sudo(), Some("alice"));
    }

    #[test]
    fn test_validate_maps_failure_status() {
        let client = client_with_token("token");
        let result = client.validate(
            HttpMethod::Get,
            "https://gitlab.example.com/api/v4/projects/1",
            response(404, r#"{"message":"404 Project Not Found"}"#),
        );

        let Err(HttpError::Response(error)) = result else {
            panic!("expected a response error");
        };
        assert_eq!(error.kind, ResponseErrorKind::NotFound);
        assert_eq!(error.status(), 404);
        assert_eq!(error.error_message(), "404 Project Not Found");
        assert_eq!(error.body(), r#"{"message":"404 Project Not Found"}"#);
    }

    #[test]
    fn test_validate_unmapped_status_succeeds() {
        let client = client_with_token("token");
        let body = client
            .validate(HttpMethod::Get, ENDPOINT, response(429, r#"{"id": 1}"#))
            .unwrap();
        assert!(body.as_record().is_some());
    }

    #[test]
    fn test_validate_classifies_bodies() {
        let client = client_with_token("token");

        let array = client
            .validate(HttpMethod::Get, ENDPOINT, response(200, "[1, 2]"))
            .unwrap();
        assert_eq!(array.as_collection().map(|c| c.len()), Some(2));

        let empty = client
            .validate(HttpMethod::Delete, ENDPOINT, response(204, ""))
            .unwrap();
        assert_eq!(empty.as_bool(), Some(false));

        let truthy = client
            .validate(HttpMethod::Post, ENDPOINT, response(201, "\"queued\""))
            .unwrap();
        assert_eq!(truthy.as_bool(), Some(true));
    }

    #[test]
    fn test_validate_invalid_json_is_parsing_error() {
        let client = client_with_token("token");
        let result = client.validate(HttpMethod::Get, ENDPOINT, response(200, "<html>"));
        assert!(matches!(result, Err(HttpError::Parsing(_))));
    }

    #[test]
    fn test_validate_attaches_links() {
        let client = client_with_token("token");
        let mut headers = HashMap::new();
        headers.insert(
            "Link".to_string(),
            vec![format!(r#"<{ENDPOINT}/projects?page=2>; rel="next""#)],
        );
        let body = client
            .validate(
                HttpMethod::Get,
                ENDPOINT,
                HttpResponse::new(200, headers, "[]".to_string()),
            )
            .unwrap();
        assert!(body.as_collection().unwrap().has_next_page());
    }

    #[test]
    fn test_path_has_param() {
        assert!(path_has_param("/projects?page=2&sudo=root", "sudo"));
        assert!(path_has_param("/projects?sudo", "sudo"));
        assert!(!path_has_param("/projects?page=2&pseudo=x", "sudo"));
        assert!(!path_has_param("/users/sudo", "sudo"));
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        assert!(matches!(
            header_pair("Bad Header", "x"),
            Err(ConfigError::InvalidHeader { .. })
        ));
        assert!(header_pair("X-Ok", "fine").is_ok());
    }
}
