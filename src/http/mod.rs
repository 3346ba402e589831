// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer for pagewalk
//!
//! A blocking reqwest client behind the [`Transport`] trait, a cookie jar
//! that survives between runs, and request/response value types.

mod client;
mod cookie;
mod request;
mod response;
mod transport;

pub use client::{HttpClient, HttpClientConfig};
pub use cookie::{Cookie, CookieJar};
pub use request::{AuthTokens, Request};
pub use response::Response;
pub use transport::{store_cookies, MockReply, MockTransport, SentRequest, Transport};

pub use reqwest::{Method, StatusCode};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Common HTTP headers
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const ACCEPT_LANGUAGE: &str = "accept-language";
    pub const AUTHORIZATION: &str = "authorization";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const LOCATION: &str = "location";
    pub const REFERER: &str = "referer";
    pub const SET_COOKIE: &str = "set-cookie";
    pub const USER_AGENT: &str = "user-agent";
}
