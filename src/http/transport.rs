// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport seam between the navigation engine and the network
//!
//! [`HttpClient`](super::HttpClient) is the real implementation.
//! [`MockTransport`] answers from a script, which is how site modules and
//! the engine itself are tested without a server.

use std::collections::{HashMap, VecDeque};

use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use tracing::trace;
use url::Url;

use super::cookie::CookieJar;
use super::request::Request;
use super::response::Response;
use super::headers;
use crate::error::{Error, Result};

/// Performs one HTTP exchange
///
/// Implementations attach the jar's cookies to the request, store the
/// response's `Set-Cookie` headers back into it and follow redirects.
/// Status codes are not interpreted.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &Request, cookies: &CookieJar) -> Result<Response>;
}

/// Store every `Set-Cookie` of a response into the jar
pub fn store_cookies(response: &Response, cookies: &CookieJar) {
    for header in response.set_cookies() {
        cookies.add_from_header(header, &response.url);
    }
}

/// One scripted answer
#[derive(Debug, Clone)]
pub struct MockReply {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
    redirect_to: Option<String>,
    failure: Option<String>,
}

impl MockReply {
    /// 200 with a body
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::status(200, body)
    }

    /// Any status with a body
    pub fn status(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            redirect_to: None,
            failure: None,
        }
    }

    /// 302 to another URL, followed like a real client would
    pub fn redirect(to: impl Into<String>) -> Self {
        Self {
            redirect_to: Some(to.into()),
            ..Self::status(302, Bytes::new())
        }
    }

    /// Recoverable network failure
    pub fn network_error(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::status(0, Bytes::new())
        }
    }

    /// Add a response header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a `Set-Cookie` header
    pub fn cookie(self, set_cookie: impl Into<String>) -> Self {
        self.header(headers::SET_COOKIE, set_cookie)
    }

    fn header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) =
                (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str()))
            {
                map.append(name, value);
            }
        }
        map
    }
}

#[derive(Debug, Default)]
struct Script {
    routes: HashMap<(Method, String), VecDeque<MockReply>>,
    sent: Vec<SentRequest>,
}

/// A request as the mock saw it
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub method: Method,
    pub url: Url,
    pub cookie: Option<String>,
    pub body: Option<String>,
    pub headers: HeaderMap,
}

/// Scripted transport for tests
///
/// Replies are queued per (method, URL); the last reply of a queue is sticky.
/// Unscripted URLs answer 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<Script>,
}

const MAX_REDIRECTS: usize = 10;

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `method url`
    pub fn on(&self, method: Method, url: &str, reply: MockReply) -> &Self {
        self.script
            .lock()
            .routes
            .entry((method, normalise(url)))
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue a reply for `GET url`
    pub fn on_get(&self, url: &str, reply: MockReply) -> &Self {
        self.on(Method::GET, url, reply)
    }

    /// Queue a reply for `POST url`
    pub fn on_post(&self, url: &str, reply: MockReply) -> &Self {
        self.on(Method::POST, url, reply)
    }

    /// Every request received so far, redirects included
    pub fn requests(&self) -> Vec<SentRequest> {
        self.script.lock().sent.clone()
    }

    /// Number of requests received for a URL, any method
    pub fn hits(&self, url: &str) -> usize {
        let url = normalise(url);
        self.script
            .lock()
            .sent
            .iter()
            .filter(|r| normalise(r.url.as_str()) == url)
            .count()
    }

    fn next_reply(&self, request: &Request, cookies: &CookieJar) -> MockReply {
        let mut script = self.script.lock();
        script.sent.push(SentRequest {
            method: request.method.clone(),
            url: request.url.clone(),
            cookie: cookies.get_cookie_header(&request.url),
            body: request.body_text(),
            headers: request.headers.clone(),
        });

        let key = (request.method.clone(), normalise(request.url.as_str()));
        match script.routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(not_found),
            Some(queue) => queue.front().cloned().unwrap_or_else(not_found),
            None => not_found(),
        }
    }
}

fn not_found() -> MockReply {
    MockReply::status(404, "not found")
}

fn normalise(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut u) => {
            u.set_fragment(None);
            u.to_string()
        }
        Err(_) => url.to_string(),
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &Request, cookies: &CookieJar) -> Result<Response> {
        let mut current = request.clone();
        let mut redirected = false;

        for _ in 0..=MAX_REDIRECTS {
            trace!("mock {} {}", current.method, current.url);
            let reply = self.next_reply(&current, cookies);
            if let Some(message) = reply.failure {
                return Err(Error::network(message));
            }

            let status = StatusCode::from_u16(reply.status)
                .map_err(|_| Error::other(format!("invalid scripted status {}", reply.status)))?;
            let mut response = Response::new(status, reply.header_map(), reply.body.clone(), current.url.clone());
            store_cookies(&response, cookies);

            match reply.redirect_to {
                Some(to) => {
                    current.url = current.url.join(&to)?;
                    current.method = Method::GET;
                    current.body = None;
                    redirected = true;
                }
                None => {
                    response.redirected = redirected;
                    return Ok(response);
                }
            }
        }

        Err(Error::network(format!("too many redirects from {}", request.url)))
    }
}
