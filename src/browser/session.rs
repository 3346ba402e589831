// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session state
//!
//! Everything a [`Browser`](super::Browser) keeps between navigations: the
//! cookie jar, the current page, the login status and the re-entrancy
//! counter that keeps login procedures from triggering nested logins.
//!
//! [`SessionSnapshot`] is the exported form, reloaded into a new browser
//! to resume a session without logging in again.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::page::Page;
use crate::error::Result;
use crate::http::{AuthTokens, Cookie, CookieJar, Response};

/// Authentication status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Anonymous => "anonymous",
            SessionStatus::Authenticating => "authenticating",
            SessionStatus::Authenticated => "authenticated",
            SessionStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why a session is in the `Failed` state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Unrecoverable transport error; cleared by the next successful navigation
    Transport,
    /// Credentials refused or account locked; cleared by explicit login/logout
    Authentication,
}

/// Login material handed to the login procedure
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Site-specific extras (website variant, secret code...)
    pub extra: HashMap<String, String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            extra: HashMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Mutable state of one session
#[derive(Clone)]
pub struct SessionState {
    pub(crate) cookies: CookieJar,
    pub(crate) page: Option<Arc<dyn Page>>,
    pub(crate) response: Option<Response>,
    pub(crate) url: Option<Url>,
    pub(crate) status: SessionStatus,
    pub(crate) logged_in: bool,
    pub(crate) failure: Option<FailureKind>,
    pub(crate) login_depth: u32,
    pub(crate) auth: AuthTokens,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) values: BTreeMap<String, serde_json::Value>,
    pub(crate) twofa_logged_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub(crate) fn new(cookies: CookieJar, credentials: Option<Credentials>) -> Self {
        Self {
            cookies,
            page: None,
            response: None,
            url: None,
            status: SessionStatus::Anonymous,
            logged_in: false,
            failure: None,
            login_depth: 0,
            auth: AuthTokens::default(),
            credentials,
            values: BTreeMap::new(),
            twofa_logged_at: None,
        }
    }

    /// Current page, if the last navigation produced one
    pub fn page(&self) -> Option<&Arc<dyn Page>> {
        self.page.as_ref()
    }

    /// Last response received through `location`
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// URL of the last navigation
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Last time a second factor was accepted
    pub fn twofa_logged_at(&self) -> Option<DateTime<Utc>> {
        self.twofa_logged_at
    }

    /// Values kept with the session by the site module
    pub fn values(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.values
    }

    /// True while a login procedure runs
    pub fn in_login(&self) -> bool {
        self.login_depth > 0
    }

    pub(crate) fn mark_logged_in(&mut self) {
        self.logged_in = true;
        self.status = SessionStatus::Authenticated;
        if self.failure == Some(FailureKind::Authentication) {
            self.failure = None;
        }
    }

    pub(crate) fn mark_logged_out(&mut self) {
        self.logged_in = false;
        if self.status == SessionStatus::Authenticated {
            self.status = SessionStatus::Anonymous;
        }
    }

    pub(crate) fn mark_failed(&mut self, kind: FailureKind) {
        self.status = SessionStatus::Failed;
        self.failure = Some(kind);
    }

    /// Leave a transport failure behind after a successful exchange
    pub(crate) fn clear_transport_failure(&mut self) {
        if self.failure == Some(FailureKind::Transport) {
            self.failure = None;
            self.status = if self.logged_in {
                SessionStatus::Authenticated
            } else {
                SessionStatus::Anonymous
            };
        }
    }

    /// Serializable view of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            url: self.url.as_ref().map(Url::to_string),
            status: self.status,
            logged_in: self.logged_in,
            cookies: self.cookies.all(),
            values: self.values.clone(),
            twofa_logged_at: self.twofa_logged_at,
            expires_at: None,
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("status", &self.status)
            .field("logged_in", &self.logged_in)
            .field("failure", &self.failure)
            .field("login_depth", &self.login_depth)
            .field("cookies", &self.cookies.len())
            .field("credentials", &self.credentials)
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Exported session
///
/// Written by [`Browser::dump_state`](super::Browser::dump_state) and
/// reloaded by [`Browser::load_state`](super::Browser::load_state).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub url: Option<String>,
    pub status: SessionStatus,
    pub logged_in: bool,
    pub cookies: Vec<Cookie>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twofa_logged_at: Option<DateTime<Utc>>,
    /// Past this date the snapshot is not reloaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|at| at < Utc::now()).unwrap_or(false)
    }

    /// Write the snapshot as JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        debug!("Saved session state to {}", path.display());
        Ok(())
    }

    /// Read a snapshot written by [`SessionSnapshot::save_to`]; `None` if the file is missing
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Self::from_json(&fs::read_to_string(path)?)?))
    }
}
