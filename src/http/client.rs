// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Blocking HTTP client built on reqwest

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Method, StatusCode};
use tracing::{debug, trace};

use super::cookie::CookieJar;
use super::request::Request;
use super::response::Response;
use super::transport::{store_cookies, Transport};
use super::{headers, DEFAULT_USER_AGENT};
use crate::error::{Error, ErrorContext, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Default timeout
    pub timeout: Duration,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Default headers
    pub default_headers: HeaderMap,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            headers::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.8,*/*;q=0.7",
            ),
        );
        default_headers.insert(
            headers::ACCEPT_LANGUAGE,
            HeaderValue::from_static("fr-FR,fr;q=0.8,en-US;q=0.5,en;q=0.3"),
        );

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            accept_invalid_certs: false,
            default_headers,
            proxy: None,
        }
    }
}

/// Blocking [`Transport`] over reqwest
///
/// Redirects are followed here rather than by reqwest, so that cookies set
/// on intermediate responses land in the jar.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(config.default_headers.clone());

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn send_once(&self, request: &Request, cookies: &CookieJar) -> Result<Response> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(cookie_header) = cookies.get_cookie_header(&request.url) {
            builder = builder.header(headers::COOKIE, cookie_header);
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let start = Instant::now();
        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                let timeout = request.timeout.unwrap_or(self.config.timeout);
                Error::timeout_with_url("request", timeout.as_millis() as u64, request.url_str())
            } else {
                Error::from(e)
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().with_url(request.url_str())?;

        let mut response = Response::new(status, headers, body, url);
        response.response_time_ms = start.elapsed().as_millis() as u64;
        store_cookies(&response, cookies);
        Ok(response)
    }
}

impl Transport for HttpClient {
    fn execute(&self, request: &Request, cookies: &CookieJar) -> Result<Response> {
        let mut current = request.clone();
        let mut redirected = false;

        for _ in 0..=self.config.max_redirects {
            trace!("{} {}", current.method, current.url);
            let mut response = self.send_once(&current, cookies)?;

            let Some(location) = response.is_redirect().then(|| response.location()).flatten() else {
                response.redirected = redirected;
                return Ok(response);
            };

            debug!("Redirect {} -> {}", current.url, location);
            redirected = true;
            current.url = location;
            if matches!(
                response.status,
                StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
            ) && current.method != Method::HEAD
            {
                current.method = Method::GET;
                current.body = None;
                current.headers.remove(headers::CONTENT_TYPE);
            }
        }

        Err(Error::network(format!(
            "too many redirects (> {}) from {}",
            self.config.max_redirects, request.url
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.config().user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_invalid_proxy() {
        let config = HttpClientConfig {
            proxy: Some("http://[broken".into()),
            ..Default::default()
        };
        assert!(matches!(HttpClient::with_config(config), Err(Error::Config(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_redirect_keeps_cookies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", "/home")
                    .insert_header("set-cookie", "sid=s3cr3t; Path=/"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/home"))
            .and(header("cookie", "sid=s3cr3t"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>Welcome</p>"))
            .mount(&server)
            .await;

        let base = server.uri();
        let (response, jar) = tokio::task::spawn_blocking(move || {
            let client = HttpClient::new().unwrap();
            let jar = CookieJar::new();
            let request = Request::post(format!("{}/login", base))
                .unwrap()
                .form([("user", "jo")]);
            (client.execute(&request, &jar).unwrap(), jar)
        })
        .await
        .unwrap();

        assert_eq!(response.status_code(), 200);
        assert!(response.redirected);
        assert!(response.url.path().ends_with("/home"));
        assert_eq!(response.text().unwrap(), "<p>Welcome</p>");
        assert_eq!(jar.get("sid").as_deref(), Some("s3cr3t"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_connection_refused_is_recoverable() {
        let err = tokio::task::spawn_blocking(|| {
            let client = HttpClient::with_config(HttpClientConfig {
                timeout: Duration::from_secs(2),
                ..Default::default()
            })
            .unwrap();
            let request = Request::get("http://127.0.0.1:9/").unwrap();
            client.execute(&request, &CookieJar::new()).unwrap_err()
        })
        .await
        .unwrap();

        assert!(err.is_recoverable());
    }
}
