// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request types

use std::time::Duration;

use base64::Engine;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use url::form_urlencoded;
use url::Url;

use super::headers;
use crate::error::Result;

/// HTTP request representation
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Absolute request URL
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<Bytes>,
    /// Per-request timeout, overriding the client's
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a request with arbitrary method
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Create a new GET request
    pub fn get(url: impl AsRef<str>) -> Result<Self> {
        Ok(Self::new(Method::GET, Url::parse(url.as_ref())?))
    }

    /// Create a new POST request
    pub fn post(url: impl AsRef<str>) -> Result<Self> {
        Ok(Self::new(Method::POST, Url::parse(url.as_ref())?))
    }

    /// Set a header; invalid names or values are ignored
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set JSON body
    pub fn json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        let json = serde_json::to_vec(data)?;
        self.body = Some(Bytes::from(json));
        Ok(self.header(headers::CONTENT_TYPE, "application/json"))
    }

    /// Set an urlencoded form body, keeping field order
    pub fn form<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.body = Some(Bytes::from(body));
        self.header(headers::CONTENT_TYPE, "application/x-www-form-urlencoded")
    }

    /// Append query parameters to the URL
    pub fn query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.url.query_pairs_mut().extend_pairs(params);
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the URL as string
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }

    /// Get a header value
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body as text, for forms and logging
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

/// Authentication material attached to every request of a session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthTokens {
    /// Bearer token
    pub bearer: Option<String>,
    /// Basic auth (username, password)
    pub basic: Option<(String, String)>,
    /// Custom auth header
    pub custom: Option<(String, String)>,
}

impl AuthTokens {
    pub fn is_empty(&self) -> bool {
        self.bearer.is_none() && self.basic.is_none() && self.custom.is_none()
    }

    /// Add the authorization headers to a request
    pub fn apply(&self, request: &mut Request) {
        if let Some(ref bearer) = self.bearer {
            set_header(request, headers::AUTHORIZATION, &format!("Bearer {}", bearer));
        } else if let Some((ref user, ref pass)) = self.basic {
            let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", user, pass));
            set_header(request, headers::AUTHORIZATION, &format!("Basic {}", encoded));
        }
        if let Some((ref header, ref value)) = self.custom {
            set_header(request, header, value);
        }
    }
}

fn set_header(request: &mut Request, name: &str, value: &str) {
    if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
        request.headers.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_creation() {
        let req = Request::get("https://example.com/path").unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.host_str(), Some("example.com"));
        assert!(Request::get("/relative").is_err());
    }

    #[test]
    fn test_request_headers() {
        let req = Request::get("https://example.com")
            .unwrap()
            .header("x-custom", "value");
        assert_eq!(req.header_value("x-custom"), Some("value"));
    }

    #[test]
    fn test_form_and_query() {
        let req = Request::post("https://bank.test/login")
            .unwrap()
            .form([("user", "jo doe"), ("pass", "p&ss")])
            .query([("step", "2")]);
        assert_eq!(req.body_text().as_deref(), Some("user=jo+doe&pass=p%26ss"));
        assert_eq!(req.url.as_str(), "https://bank.test/login?step=2");
        assert_eq!(
            req.header_value("content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_auth_tokens() {
        let mut req = Request::get("https://example.com").unwrap();
        let tokens = AuthTokens {
            basic: Some(("user".into(), "pass".into())),
            custom: Some(("x-api-key".into(), "k".into())),
            ..Default::default()
        };
        tokens.apply(&mut req);
        assert_eq!(req.header_value("authorization"), Some("Basic dXNlcjpwYXNz"));
        assert_eq!(req.header_value("x-api-key"), Some("k"));

        let mut req = Request::get("https://example.com").unwrap();
        AuthTokens {
            bearer: Some("t0k".into()),
            ..tokens
        }
        .apply(&mut req);
        assert_eq!(req.header_value("authorization"), Some("Bearer t0k"));
    }
}
