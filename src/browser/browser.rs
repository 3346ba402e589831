// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Navigation and session engine

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use reqwest::header::HeaderValue;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use super::config::BrowserConfig;
use super::dispatch::{PatternSet, Resolution, UrlDispatcher};
use super::form::Form;
use super::page::{downcast_page, LoadOutcome, Page};
use super::recorder::ResponseRecorder;
use super::session::{Credentials, FailureKind, SessionSnapshot, SessionState, SessionStatus};
use super::two_factor::TwoFactor;
use crate::error::{Error, Result};
use crate::http::{headers, AuthTokens, CookieJar, HttpClient, Request, Response, Transport};

/// Site login: navigates with the browser, returns `Ok` once logged in
pub type LoginProcedure = Arc<dyn Fn(&Browser, &Credentials) -> Result<()> + Send + Sync>;

/// Site logout, run before the cookie jar is dropped
pub type LogoutProcedure = Arc<dyn Fn(&Browser) -> Result<()> + Send + Sync>;

/// Tells whether the session is logged in, looking at the current state
pub type LoggedPredicate = Arc<dyn Fn(&Browser) -> bool + Send + Sync>;

/// Builder for [`Browser`]
pub struct BrowserBuilder {
    config: BrowserConfig,
    patterns: PatternSet,
    transport: Option<Arc<dyn Transport>>,
    credentials: Option<Credentials>,
    login: Option<LoginProcedure>,
    logout: Option<LogoutProcedure>,
    is_logged: Option<LoggedPredicate>,
    two_factor: Option<TwoFactor>,
}

impl BrowserBuilder {
    /// Set the configuration
    pub fn config(mut self, config: BrowserConfig) -> Self {
        self.config = config;
        self
    }

    /// Use another transport than the reqwest client
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Login procedure, run on demand and when a page shows the session logged out
    pub fn login<F>(mut self, procedure: F) -> Self
    where
        F: Fn(&Browser, &Credentials) -> Result<()> + Send + Sync + 'static,
    {
        self.login = Some(Arc::new(procedure));
        self
    }

    pub fn logout<F>(mut self, procedure: F) -> Self
    where
        F: Fn(&Browser) -> Result<()> + Send + Sync + 'static,
    {
        self.logout = Some(Arc::new(procedure));
        self
    }

    /// Consulted after every page load; `false` triggers the login procedure
    pub fn is_logged<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Browser) -> bool + Send + Sync + 'static,
    {
        self.is_logged = Some(Arc::new(predicate));
        self
    }

    /// Second factor handling; the login procedure then only starts a login
    pub fn two_factor(mut self, two_factor: TwoFactor) -> Self {
        self.two_factor = Some(two_factor);
        self
    }

    /// Compile the patterns, open the cookie file and create the transport
    pub fn build(self) -> Result<Browser> {
        let dispatcher = self.patterns.compile(self.config.base_url.as_ref())?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpClient::with_config(self.config.http_config()?)?),
        };

        let cookies = match self.config.cookie_file {
            Some(ref path) => CookieJar::load_from(path)?,
            None => CookieJar::new(),
        };

        let recorder = self
            .config
            .responses_dir
            .as_ref()
            .map(|dir| ResponseRecorder::new(dir.clone()));

        Ok(Browser {
            config: self.config,
            transport,
            dispatcher,
            login: self.login,
            logout: self.logout,
            is_logged: self.is_logged,
            two_factor: self.two_factor,
            recorder,
            state: ReentrantMutex::new(RefCell::new(SessionState::new(cookies, self.credentials))),
        })
    }
}

/// Stateful browser for one site session
///
/// Every navigation goes through [`Browser::location`]: the response is
/// dispatched to a page, which becomes the current page. When a page shows
/// the session logged out, the login procedure runs and the navigation is
/// retried once.
///
/// The session lock is reentrant: page hooks and the login procedure
/// navigate with the same browser.
pub struct Browser {
    config: BrowserConfig,
    transport: Arc<dyn Transport>,
    dispatcher: UrlDispatcher,
    login: Option<LoginProcedure>,
    logout: Option<LogoutProcedure>,
    is_logged: Option<LoggedPredicate>,
    two_factor: Option<TwoFactor>,
    recorder: Option<ResponseRecorder>,
    state: ReentrantMutex<RefCell<SessionState>>,
}

/// Lock on the session, keeping the current page stable
pub struct SessionGuard<'a> {
    guard: ReentrantMutexGuard<'a, RefCell<SessionState>>,
}

impl SessionGuard<'_> {
    /// Read a copy of the session state
    ///
    /// `f` may navigate with the browser; it keeps seeing the state as it
    /// was when called.
    pub fn state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let state = self.guard.borrow().clone();
        f(&state)
    }

    pub fn page(&self) -> Option<Arc<dyn Page>> {
        self.guard.borrow().page.clone()
    }

    pub fn page_as<T: Page>(&self) -> Option<Arc<T>> {
        self.page().and_then(downcast_page::<T>)
    }

    pub fn url(&self) -> Option<Url> {
        self.guard.borrow().url.clone()
    }
}

enum Step {
    Done,
    Again,
}

impl Browser {
    /// Start building a browser from its dispatch table
    pub fn builder(patterns: PatternSet) -> BrowserBuilder {
        BrowserBuilder {
            config: BrowserConfig::default(),
            patterns,
            transport: None,
            credentials: None,
            login: None,
            logout: None,
            is_logged: None,
            two_factor: None,
        }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &UrlDispatcher {
        &self.dispatcher
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.with_state(|st| st.credentials.clone())
    }

    /// Store an answer for the next login, under the key the site asked for
    pub fn set_credential(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.with_state(|st| match st.credentials {
            Some(ref mut credentials) => {
                credentials.extra.insert(key.into(), value.into());
                Ok(())
            }
            None => Err(Error::Config("No credentials configured".into())),
        })
    }

    pub(crate) fn forget_credential(&self, key: &str) {
        self.with_state(|st| {
            if let Some(ref mut credentials) = st.credentials {
                credentials.extra.remove(key);
            }
        });
    }

    /// Last time a second factor was accepted
    pub fn twofa_logged_at(&self) -> Option<DateTime<Utc>> {
        self.with_state(|st| st.twofa_logged_at)
    }

    pub(crate) fn set_twofa_logged_at(&self, at: DateTime<Utc>) {
        self.with_state(|st| st.twofa_logged_at = Some(at));
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        f(&mut state)
    }

    /// Hold the session lock for several consistent reads
    pub fn lock(&self) -> SessionGuard<'_> {
        SessionGuard {
            guard: self.state.lock(),
        }
    }

    /// Current page
    pub fn page(&self) -> Option<Arc<dyn Page>> {
        self.with_state(|st| st.page.clone())
    }

    /// Current page, if it has type `T`
    pub fn page_as<T: Page>(&self) -> Option<Arc<T>> {
        self.page().and_then(downcast_page::<T>)
    }

    pub fn is_on_page<T: Page>(&self) -> bool {
        self.page().map(|p| p.is::<T>()).unwrap_or(false)
    }

    /// Run `f` on the current page while holding the session lock
    pub fn with_page<T: Page, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let _guard = self.state.lock();
        let page = self.page()?;
        page.downcast_ref::<T>().map(f)
    }

    /// URL of the last navigation
    pub fn url(&self) -> Option<Url> {
        self.with_state(|st| st.url.clone())
    }

    /// Last response received through `location`
    pub fn response(&self) -> Option<Response> {
        self.with_state(|st| st.response.clone())
    }

    pub fn status(&self) -> SessionStatus {
        self.with_state(|st| st.status)
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.with_state(|st| st.failure)
    }

    /// Whether the last login succeeded and no page showed the session logged out since
    pub fn logged(&self) -> bool {
        self.with_state(|st| st.logged_in)
    }

    /// The session's cookie jar
    pub fn cookies(&self) -> CookieJar {
        self.with_state(|st| st.cookies.clone())
    }

    /// Authentication headers sent with every request, until logout
    pub fn set_auth(&self, tokens: AuthTokens) {
        self.with_state(|st| st.auth = tokens);
    }

    /// Serializable view of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        self.with_state(|st| st.snapshot())
    }

    /// Keep a value with the session; it is part of the dumped state
    pub fn set_value(&self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.with_state(|st| {
            st.values.insert(key.into(), value);
        });
        Ok(())
    }

    /// Value kept with [`Browser::set_value`] or reloaded from a state
    pub fn value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.with_state(|st| st.values.get(key).cloned()) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Export the session for a later [`Browser::load_state`]
    ///
    /// Cookies the second factor does not need are dropped first. The
    /// state expires after the configured state duration, or at the end
    /// of the second factor trust window when that is later.
    pub fn dump_state(&self) -> SessionSnapshot {
        let _guard = self.state.lock();
        if let Some(ref two_factor) = self.two_factor {
            let jar = self.cookies();
            for cookie in jar.all() {
                if two_factor.cookies_to_clear().contains(&cookie.name) {
                    jar.remove(&cookie.name, &cookie.domain, &cookie.path);
                }
            }
        }

        let mut state = self.snapshot();
        state.expires_at = self.state_expiry(state.twofa_logged_at);
        debug!("Dumped session state with {} cookies", state.cookies.len());
        state
    }

    fn state_expiry(&self, twofa_logged_at: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        let duration = TimeDelta::from_std(self.config.state_duration?).ok()?;
        let expires = Utc::now().checked_add_signed(duration)?;
        let trusted = self
            .two_factor
            .as_ref()
            .zip(twofa_logged_at)
            .and_then(|(two_factor, at)| two_factor.trusted_until(at));
        Some(trusted.map_or(expires, |trusted| trusted.max(expires)))
    }

    /// Resume a session exported by [`Browser::dump_state`]
    ///
    /// Loads the cookies and values, then goes back to the saved URL; an
    /// HTTP error status there is ignored. Returns `false` without touching
    /// the session when the state expired.
    pub fn load_state(&self, state: &SessionSnapshot) -> Result<bool> {
        let _guard = self.state.lock();
        if state.is_expired() {
            info!("Session state expired, not reloading it");
            return Ok(false);
        }

        self.with_state(|st| {
            for cookie in &state.cookies {
                st.cookies.add(cookie.clone());
            }
            st.values.extend(state.values.clone());
            st.twofa_logged_at = state.twofa_logged_at;
        });
        debug!("Reloaded {} cookies from session state", state.cookies.len());
        self.persist_cookies();

        if let Some(ref url) = state.url {
            match self.location(url) {
                Ok(_) => {}
                Err(e) if e.status_code().is_some() => debug!("Not back on {}: {}", url, e),
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }

    /// Absolute URL for a target, relative to the current URL or the base URL
    pub fn absurl(&self, target: &str) -> Result<Url> {
        let mut url = match Url::parse(target) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self
                    .url()
                    .or_else(|| self.config.base_url.clone())
                    .ok_or_else(|| {
                        Error::Config(format!("Cannot resolve '{}' without a base URL", target))
                    })?;
                base.join(target)?
            }
            Err(e) => return Err(e.into()),
        };
        url.set_fragment(None);
        Ok(url)
    }

    /// Absolute URL with query parameters appended
    pub fn build_url<I, K, V>(&self, target: &str, params: I) -> Result<Url>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut url = self.absurl(target)?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    /// Request for a target, resolved with [`Browser::absurl`]
    pub fn request(&self, method: Method, target: &str) -> Result<Request> {
        Ok(Request::new(method, self.absurl(target)?))
    }

    /// Navigate to a target and make its page current
    pub fn location(&self, target: &str) -> Result<Response> {
        self.location_request(self.request(Method::GET, target)?)
    }

    /// Navigate with a prepared request and make its page current
    ///
    /// Returns the last response of the session, which is the one of this
    /// navigation unless a page hook navigated further.
    pub fn location_request(&self, request: Request) -> Result<Response> {
        let _guard = self.state.lock();
        let result = self.navigate(&request);
        self.persist_cookies();
        result
    }

    /// Submit a form extracted from a page
    pub fn submit(&self, form: &Form) -> Result<Response> {
        self.location_request(form.request()?)
    }

    /// Go to the site root
    pub fn home(&self) -> Result<Response> {
        let home = match self.config.base_url {
            Some(ref base) => base.clone(),
            None => self.absurl("/")?,
        };
        self.location(home.as_str())
    }

    /// Fetch a target without touching the current page
    pub fn open(&self, target: &str) -> Result<Response> {
        self.open_request(self.request(Method::GET, target)?)
    }

    /// Fetch a request without touching the current page
    pub fn open_request(&self, request: Request) -> Result<Response> {
        let _guard = self.state.lock();
        let result = self.fetch(&request);
        self.persist_cookies();
        result
    }

    /// Fetch a target and build its page, without making it current
    ///
    /// `on_loaded` is not run.
    pub fn open_page(&self, target: &str) -> Result<Option<Arc<dyn Page>>> {
        let request = self.request(Method::GET, target)?;
        let _guard = self.state.lock();
        let response = self.fetch(&request)?;
        self.persist_cookies();
        self.resolve(&request, &response)
    }

    fn navigate(&self, request: &Request) -> Result<Response> {
        let mut retried = false;

        loop {
            let response = self.fetch(request)?;
            let page = self.resolve(request, &response)?;
            self.set_current(page.clone(), &response);

            let outcome = match page {
                Some(ref page) => page.on_loaded(self)?,
                None => LoadOutcome::Ready,
            };

            match self.next_step(outcome, page.as_deref(), retried, &response)? {
                Step::Done => {
                    return Ok(self.response().unwrap_or(response));
                }
                Step::Again => {
                    debug!("Retrying {} {}", request.method, request.url);
                    retried = true;
                }
            }
        }
    }

    fn next_step(
        &self,
        outcome: LoadOutcome,
        page: Option<&dyn Page>,
        retried: bool,
        response: &Response,
    ) -> Result<Step> {
        let logged_out = match outcome {
            LoadOutcome::Retry if retried => {
                warn!("{} asked for a second retry, keeping it", response.url);
                return Ok(Step::Done);
            }
            LoadOutcome::Retry => return Ok(Step::Again),
            LoadOutcome::LoggedOut => true,
            LoadOutcome::Ready => match self.is_logged {
                Some(ref is_logged) => !is_logged(self),
                None => false,
            },
        };

        if !logged_out {
            let logged_page = page.map(|p| p.logged()).unwrap_or(false);
            self.with_state(|st| {
                if logged_page && !st.in_login() && !st.logged_in {
                    st.mark_logged_in();
                }
            });
            return Ok(Step::Done);
        }

        let (in_login, auth_failed) = self.with_state(|st| {
            st.mark_logged_out();
            (st.in_login(), st.failure == Some(FailureKind::Authentication))
        });
        let url = response.url.to_string();

        if in_login {
            return Ok(Step::Done);
        }
        if retried {
            return Err(Error::LoggedOut { url });
        }
        if self.login.is_none() || self.credentials().is_none() {
            return match outcome {
                LoadOutcome::LoggedOut => Err(Error::LoggedOut { url }),
                _ => Ok(Step::Done),
            };
        }
        if auth_failed {
            debug!("Not logging in again after an authentication failure");
            return Err(Error::LoggedOut { url });
        }

        info!("Logged out on {}, logging in", url);
        self.run_login()?;
        Ok(Step::Again)
    }

    fn set_current(&self, page: Option<Arc<dyn Page>>, response: &Response) {
        if let Some(previous) = self.page() {
            previous.on_leave(self);
        }
        self.with_state(|st| {
            st.page = page;
            st.response = Some(response.clone());
            st.url = Some(response.url.clone());
        });
    }

    fn resolve(&self, request: &Request, response: &Response) -> Result<Option<Arc<dyn Page>>> {
        let resolution = self.dispatcher.resolve(response)?;
        if let Resolution::Page(page) = resolution {
            return Ok(Some(page));
        }

        let downgraded = self
            .config
            .base_url
            .as_ref()
            .map(|base| base.scheme() == "https" && response.url.scheme() != "https")
            .unwrap_or(false);
        if downgraded {
            return Err(Error::HttpsDowngrade {
                url: response.url.to_string(),
            });
        }

        if self.dispatcher.is_empty() {
            return Ok(None);
        }

        let saved_to = match self.recorder {
            Some(ref recorder) if !self.config.save_responses => recorder
                .save(request, response, true)
                .map_err(|e| warn!("Unable to save response: {}", e))
                .ok(),
            _ => None,
        };

        match resolution {
            Resolution::Rejected => warn!("Every page matching {} rejected it", response.url),
            _ => warn!("Unable to handle {}", response.url),
        }
        Err(Error::NoPage {
            url: response.url.to_string(),
            saved_to,
        })
    }

    /// One request with bounded retries of transient failures
    fn fetch(&self, request: &Request) -> Result<Response> {
        let mut request = request.clone();
        let (cookies, auth, referer) =
            self.with_state(|st| (st.cookies.clone(), st.auth.clone(), st.url.clone()));
        auth.apply(&mut request);
        if let Some(referer) = referer.filter(|r| referrer_allowed(r, &request.url)) {
            if let Ok(value) = HeaderValue::from_str(referer.as_str()) {
                request.headers.entry(headers::REFERER).or_insert(value);
            }
        }

        let attempts = self.config.max_attempts.max(1);
        let mut reason = String::new();

        for attempt in 1..=attempts {
            debug!("{} {} (attempt {}/{})", request.method, request.url, attempt, attempts);
            match self.transport.execute(&request, &cookies) {
                Ok(response) if self.config.is_retry_status(response.status_code()) => {
                    warn!("{} answered {}, attempt {}/{}", request.url, response.status, attempt, attempts);
                    reason = format!("HTTP {}", response.status);
                }
                Ok(response) => {
                    if self.config.save_responses {
                        if let Some(ref recorder) = self.recorder {
                            if let Err(e) = recorder.save(&request, &response, false) {
                                warn!("Unable to save response: {}", e);
                            }
                        }
                    }

                    if !response.is_success() {
                        self.with_state(|st| st.mark_failed(FailureKind::Transport));
                        return Err(Error::HttpStatus {
                            url: response.url.to_string(),
                            status: response.status_code(),
                        });
                    }

                    self.with_state(|st| st.clear_transport_failure());
                    return Ok(response);
                }
                Err(e) if e.is_recoverable() => {
                    warn!("{} failed: {}, attempt {}/{}", request.url, e, attempt, attempts);
                    reason = e.to_string();
                }
                Err(e) => {
                    self.with_state(|st| st.mark_failed(FailureKind::Transport));
                    return Err(e);
                }
            }

            if attempt < attempts && !self.config.retry_delay.is_zero() {
                thread::sleep(self.config.retry_delay);
            }
        }

        self.with_state(|st| st.mark_failed(FailureKind::Transport));
        Err(Error::Unavailable {
            url: request.url.to_string(),
            attempts,
            reason,
        })
    }

    fn run_login(&self) -> Result<()> {
        let (Some(procedure), Some(credentials)) = (self.login.as_ref(), self.credentials()) else {
            return Err(Error::Config("No login procedure or credentials configured".into()));
        };

        let _guard = self.state.lock();
        self.with_state(|st| {
            st.status = SessionStatus::Authenticating;
            st.login_depth += 1;
        });
        debug!("Logging in as {}", credentials.username);

        let result = match self.two_factor {
            Some(ref two_factor) => two_factor.authenticate(self, procedure, &credentials),
            None => procedure(self, &credentials),
        };

        self.with_state(|st| {
            st.login_depth = st.login_depth.saturating_sub(1);
            match result {
                Ok(()) => st.mark_logged_in(),
                Err(ref e) if e.is_authentication() => st.mark_failed(FailureKind::Authentication),
                Err(_) if st.status == SessionStatus::Authenticating => {
                    st.status = SessionStatus::Anonymous
                }
                Err(_) => {}
            }
        });

        match result {
            Ok(()) => info!("Logged in as {}", credentials.username),
            Err(ref e) => warn!("Login failed: {}", e),
        }
        result
    }

    /// Run the login procedure, clearing a previous authentication failure
    pub fn login(&self) -> Result<()> {
        let _guard = self.state.lock();
        self.with_state(|st| {
            if st.failure == Some(FailureKind::Authentication) {
                st.failure = None;
                st.status = SessionStatus::Anonymous;
            }
        });
        let result = self.run_login();
        self.persist_cookies();
        result
    }

    /// Log in unless already logged in or on a page behind the login
    pub fn need_login(&self) -> Result<()> {
        let logged = self.with_state(|st| {
            st.logged_in || st.page.as_ref().map(|p| p.logged()).unwrap_or(false)
        });
        if logged {
            Ok(())
        } else {
            self.login()
        }
    }

    /// Run the logout procedure and start over with an empty cookie jar
    pub fn logout(&self) -> Result<()> {
        let _guard = self.state.lock();
        let result = match self.logout {
            Some(ref procedure) => procedure(self),
            None => Ok(()),
        };

        self.with_state(|st| {
            st.cookies = CookieJar::new();
            st.auth = AuthTokens::default();
            st.logged_in = false;
            st.failure = None;
            st.status = SessionStatus::Anonymous;
        });
        info!("Logged out");
        self.persist_cookies();
        result
    }

    /// Collect items across paginated pages
    ///
    /// `extract` reads the current page and returns its items and the link
    /// to the next page, which is then loaded with [`Browser::location`].
    pub fn pagination<T, F>(&self, mut extract: F) -> Result<Vec<T>>
    where
        F: FnMut(&Browser) -> Result<(Vec<T>, Option<String>)>,
    {
        let _guard = self.state.lock();
        let mut items = Vec::new();
        let mut visited: HashSet<String> = self.url().map(|u| u.to_string()).into_iter().collect();

        loop {
            let (page_items, next) = extract(self)?;
            items.extend(page_items);

            let Some(next) = next else {
                return Ok(items);
            };
            let next = self.absurl(&next)?;
            if !visited.insert(next.to_string()) {
                warn!("Pagination loops back to {}, stopping", next);
                return Ok(items);
            }
            debug!("Next page: {}", next);
            self.location(next.as_str())?;
        }
    }

    /// Write the cookie jar to the configured cookie file
    pub fn save_cookies(&self) -> Result<()> {
        match self.config.cookie_file {
            Some(ref path) => self.cookies().save_to(path),
            None => Ok(()),
        }
    }

    fn persist_cookies(&self) {
        if let Err(e) = self.save_cookies() {
            warn!("Unable to save cookies: {}", e);
        }
    }
}

fn referrer_allowed(from: &Url, to: &Url) -> bool {
    !(from.scheme() == "https" && to.scheme() != "https")
}

impl fmt::Debug for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Browser")
            .field("base_url", &self.config.base_url.as_ref().map(Url::as_str))
            .field("dispatcher", &self.dispatcher)
            .field("two_factor", &self.two_factor)
            .field("state", &*self.state.lock().borrow())
            .finish()
    }
}
