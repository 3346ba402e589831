// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie jar shared by every request of a session
//!
//! The jar is the only state carried from one navigation to the next. It can
//! be exported to a JSON file and loaded back to resume a session.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::Result;

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Domain the cookie belongs to, without leading dot
    pub domain: String,
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// HTTPS only
    pub secure: bool,
    #[serde(default)]
    pub host_only: bool,
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            host_only: false,
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into().trim_start_matches('.').to_lowercase();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp <= Utc::now())
    }

    /// Check if the cookie must be sent to the given URL
    pub fn matches(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("").to_lowercase();
        self.domain_matches(&host)
            && self.path_matches(url.path())
            && (!self.secure || url.scheme() == "https")
            && !self.is_expired()
    }

    fn domain_matches(&self, host: &str) -> bool {
        if self.domain.is_empty() {
            return true;
        }
        if self.host_only {
            return host == self.domain;
        }
        host == self.domain || host.ends_with(&format!(".{}", self.domain))
    }

    fn path_matches(&self, request_path: &str) -> bool {
        if request_path == self.path {
            return true;
        }
        request_path.starts_with(&self.path)
            && (self.path.ends_with('/') || request_path[self.path.len()..].starts_with('/'))
    }

    /// Parse a Set-Cookie header value received from `url`
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let mut parts = header.split(';');
        let first = parts.next()?.trim();

        let (name, value) = first.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let mut cookie = Cookie::new(name, value.trim().trim_matches('"'));

        cookie.domain = url.host_str().unwrap_or("").to_lowercase();
        cookie.host_only = true;
        cookie.path = default_path(url);

        let mut max_age = None;
        for part in parts {
            let part = part.trim();
            let (attr, val) = match part.split_once('=') {
                Some((a, v)) => (a.trim().to_lowercase(), v.trim()),
                None => (part.to_lowercase(), ""),
            };
            match attr.as_str() {
                "domain" if !val.is_empty() => {
                    cookie.domain = val.trim_start_matches('.').to_lowercase();
                    cookie.host_only = false;
                }
                "path" if val.starts_with('/') => cookie.path = val.to_string(),
                "expires" => {
                    if let Some(dt) = parse_expires(val) {
                        cookie.expires = Some(dt);
                    }
                }
                "max-age" => max_age = val.parse::<i64>().ok(),
                "secure" => cookie.secure = true,
                _ => {}
            }
        }

        // Max-Age wins over Expires
        if let Some(secs) = max_age {
            cookie.expires = Some(match TimeDelta::try_seconds(secs) {
                Some(delta) if secs > 0 => Utc::now() + delta,
                _ => DateTime::<Utc>::MIN_UTC,
            });
        }

        Some(cookie)
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Directory of the request path, as the default cookie path
fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(i) => path[..i].to_string(),
    }
}

fn parse_expires(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%a, %d-%b-%Y %H:%M:%S GMT", "%A, %d-%b-%y %H:%M:%S GMT", "%a, %d %b %Y %H:%M:%S GMT"]
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
        .map(|naive| naive.and_utc())
}

/// Thread-safe cookie storage
///
/// Clones share the same storage.
#[derive(Debug, Clone)]
pub struct CookieJar {
    /// Cookies stored by domain
    cookies: Arc<DashMap<String, Vec<Cookie>>>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self {
            cookies: Arc::new(DashMap::new()),
        }
    }

    /// Add a cookie, replacing one with the same name, domain and path
    ///
    /// An already expired cookie deletes its namesake instead.
    pub fn add(&self, cookie: Cookie) {
        let mut entry = self.cookies.entry(cookie.domain.clone()).or_default();
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);
        if !cookie.is_expired() {
            entry.push(cookie);
        }
    }

    /// Add a cookie from a Set-Cookie header
    pub fn add_from_header(&self, header: &str, url: &Url) {
        match Cookie::parse(header, url) {
            Some(cookie) => self.add(cookie),
            None => debug!("Ignoring malformed Set-Cookie header: {}", header),
        }
    }

    /// Get all cookies for a URL, longest path first
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        self.remove_expired();

        let mut result: Vec<Cookie> = self
            .cookies
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|c| c.matches(url))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        result.sort_by(|a, b| b.path.len().cmp(&a.path.len()));
        result
    }

    /// Get Cookie header value for a URL
    pub fn get_cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.get_cookies(url);
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(|c| c.to_header_value())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Value of a cookie by name, any domain
    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies.iter().find_map(|entry| {
            entry
                .value()
                .iter()
                .find(|c| c.name == name && !c.is_expired())
                .map(|c| c.value.clone())
        })
    }

    /// Remove a specific cookie
    pub fn remove(&self, name: &str, domain: &str, path: &str) {
        if let Some(mut cookies) = self.cookies.get_mut(domain) {
            cookies.retain(|c| c.name != name || c.path != path);
        }
    }

    /// Clear all cookies
    pub fn clear(&self) {
        self.cookies.clear();
    }

    fn remove_expired(&self) {
        for mut entry in self.cookies.iter_mut() {
            entry.value_mut().retain(|c| !c.is_expired());
        }
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every stored cookie, sorted by domain then name
    pub fn all(&self) -> Vec<Cookie> {
        let mut all_cookies: Vec<Cookie> = self
            .cookies
            .iter()
            .flat_map(|e| e.value().clone())
            .collect();
        all_cookies.sort_by(|a, b| (&a.domain, &a.name).cmp(&(&b.domain, &b.name)));
        all_cookies
    }

    /// Export all cookies as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.all())
    }

    /// Import cookies from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let cookies: Vec<Cookie> = serde_json::from_str(json)?;
        let jar = CookieJar::new();
        for cookie in cookies {
            jar.add(cookie);
        }
        Ok(jar)
    }

    /// Write the jar to a JSON file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.remove_expired();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        debug!("Saved {} cookies to {}", self.len(), path.display());
        Ok(())
    }

    /// Load a jar written by [`CookieJar::save_to`]; a missing file gives an empty jar
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let jar = Self::from_json(&fs::read_to_string(path)?)?;
        debug!("Loaded {} cookies from {}", jar.len(), path.display());
        Ok(jar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_parsing() {
        let url = Url::parse("https://example.com/path").unwrap();
        let header = "session=abc123; Domain=.example.com; Path=/; Secure; HttpOnly";
        let cookie = Cookie::parse(header, &url).unwrap();

        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.domain, "example.com");
        assert_eq!(cookie.path, "/");
        assert!(cookie.secure);
        assert!(!cookie.host_only);
    }

    #[test]
    fn test_host_only_and_default_path() {
        let url = Url::parse("https://bank.test/accounts/list").unwrap();
        let cookie = Cookie::parse("sid=1", &url).unwrap();
        assert!(cookie.host_only);
        assert_eq!(cookie.path, "/accounts");

        assert!(cookie.matches(&Url::parse("https://bank.test/accounts/42").unwrap()));
        assert!(!cookie.matches(&Url::parse("https://bank.test/accountsx").unwrap()));
        assert!(!cookie.matches(&Url::parse("https://www.bank.test/accounts").unwrap()));
    }

    #[test]
    fn test_cookie_jar() {
        let jar = CookieJar::new();
        let url = Url::parse("https://example.com/path").unwrap();

        jar.add(Cookie::new("test", "value").domain("example.com"));
        assert_eq!(jar.len(), 1);

        let cookies = jar.get_cookies(&url);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "test");
        assert_eq!(jar.get_cookie_header(&url).as_deref(), Some("test=value"));
    }

    #[test]
    fn test_expired_cookie_deletes() {
        let jar = CookieJar::new();
        let url = Url::parse("https://example.com/").unwrap();

        jar.add_from_header("sid=1; Path=/", &url);
        assert_eq!(jar.get("sid").as_deref(), Some("1"));

        jar.add_from_header("sid=; Path=/; Max-Age=0", &url);
        assert!(jar.get("sid").is_none());
        assert!(jar.is_empty());
    }

    #[test]
    fn test_secure_cookie_not_sent_over_http() {
        let jar = CookieJar::new();
        jar.add(Cookie::new("s", "1").domain("example.com").secure(true));
        assert!(jar
            .get_cookies(&Url::parse("http://example.com/").unwrap())
            .is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("cookies.json");

        let jar = CookieJar::new();
        jar.add(Cookie::new("sid", "abc").domain("bank.test"));
        jar.save_to(&path).unwrap();

        let loaded = CookieJar::load_from(&path).unwrap();
        assert_eq!(loaded.get("sid").as_deref(), Some("abc"));

        let missing = CookieJar::load_from(&dir.path().join("none.json")).unwrap();
        assert!(missing.is_empty());
    }
}
