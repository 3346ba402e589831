// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Two-factor login
//!
//! Sites with strong authentication log in over two rounds. The first login
//! ends with the site asking something ([`Error::Question`]) or waiting for
//! a validation in another app ([`Error::AppValidation`]). The caller stores
//! the answer in the credentials under the question's key and logs in again;
//! [`TwoFactor`] then hands the answer to the handler registered for that key
//! instead of starting a new login.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

use super::browser::{Browser, LoginProcedure};
use super::session::Credentials;
use crate::error::{Error, Result};

/// Finishes a login with the answer stored under its key
pub type SecondFactorHandler = Arc<dyn Fn(&Browser, &str) -> Result<()> + Send + Sync>;

/// Second factor handling for a login procedure
#[derive(Clone, Default)]
pub struct TwoFactor {
    methods: Vec<(String, SecondFactorHandler)>,
    interactive: bool,
    credentials_only: bool,
    duration: Option<Duration>,
    cookies_to_clear: Vec<String>,
}

impl TwoFactor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler run when the credentials hold a value for `key`
    ///
    /// Methods are tried in registration order; the first answered key wins.
    pub fn method<F>(mut self, key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Browser, &str) -> Result<()> + Send + Sync + 'static,
    {
        self.methods.push((key.into(), Arc::new(handler)));
        self
    }

    /// Whether someone can answer the site's questions
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// The site may also log in with the credentials alone
    pub fn credentials_only(mut self, credentials_only: bool) -> Self {
        self.credentials_only = credentials_only;
        self
    }

    /// How long the site trusts an accepted second factor
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Cookie dropped before the session state is dumped
    pub fn clear_cookie(mut self, name: impl Into<String>) -> Self {
        self.cookies_to_clear.push(name.into());
        self
    }

    /// Credential keys with a registered handler
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|(key, _)| key.as_str())
    }

    pub(crate) fn cookies_to_clear(&self) -> &[String] {
        &self.cookies_to_clear
    }

    /// End of the trust window opened at `logged_at`
    pub(crate) fn trusted_until(&self, logged_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let duration = TimeDelta::from_std(self.duration?).ok()?;
        logged_at.checked_add_signed(duration)
    }

    /// Run the handler of the first answered key, or start a fresh login
    pub(crate) fn authenticate(
        &self,
        browser: &Browser,
        init_login: &LoginProcedure,
        credentials: &Credentials,
    ) -> Result<()> {
        if self.methods.is_empty() {
            return Err(Error::Config("No second factor method configured".into()));
        }

        let answered = self.methods.iter().find_map(|(key, handler)| {
            credentials
                .get(key)
                .filter(|value| !value.is_empty())
                .map(|value| (key, handler, value))
        });

        let Some((key, handler, value)) = answered else {
            if !self.credentials_only && !self.interactive {
                return Err(Error::NeedInteractive);
            }
            debug!("No second factor answer, starting a new login");
            browser.cookies().clear();
            return init_login(browser, credentials);
        };

        debug!("Answering second factor '{}'", key);
        if let Err(e) = handler(browser, value) {
            // a consumed answer must not block the other methods next time
            if e.is_interaction() {
                browser.forget_credential(key);
            }
            return Err(e);
        }

        info!("Second factor '{}' accepted", key);
        browser.set_twofa_logged_at(Utc::now());
        for key in self.keys() {
            browser.forget_credential(key);
        }
        Ok(())
    }
}

impl fmt::Debug for TwoFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwoFactor")
            .field("methods", &self.keys().collect::<Vec<_>>())
            .field("interactive", &self.interactive)
            .field("credentials_only", &self.credentials_only)
            .field("duration", &self.duration)
            .field("cookies_to_clear", &self.cookies_to_clear)
            .finish()
    }
}
