// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page model
//!
//! A page wraps one parsed response together with the URL that produced it
//! and the captures of the pattern that selected it. Site modules implement
//! [`Page`] on their own types; the navigation engine builds them through
//! the factories registered in a [`PatternSet`](super::PatternSet).

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use url::Url;

use super::browser::Browser;
use super::form::Form;
use crate::dom::{Document, DocumentKind, HtmlDocument, Node};
use crate::error::{Error, Result};
use crate::filters::{Context, Env, Filter, FromValue};
use crate::http::Response;

/// What a page asks the engine to do once it is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Page is usable
    Ready,
    /// Navigate again to the same request (at most once per call)
    Retry,
    /// The session is not (or no longer) logged in
    LoggedOut,
}

/// Downcasting support for page trait objects
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A loaded page
pub trait Page: AsAny {
    /// Document, URL and captures the page was built from
    fn data(&self) -> &PageData;

    /// Runs once, right after construction, before the page becomes current
    ///
    /// Site-reported conditions (maintenance, captcha...) are returned as
    /// errors; session expiry as [`LoadOutcome::LoggedOut`].
    fn on_loaded(&self, _browser: &Browser) -> Result<LoadOutcome> {
        Ok(LoadOutcome::Ready)
    }

    /// Runs when the next navigation replaces this page
    fn on_leave(&self, _browser: &Browser) {}

    /// Structural check after URL dispatch
    fn is_here(&self) -> bool {
        true
    }

    /// Pages only reachable behind the login return true
    fn logged(&self) -> bool {
        false
    }
}

impl dyn Page {
    /// Borrow as a concrete page type
    pub fn downcast_ref<T: Page>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Page>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn url(&self) -> &Url {
        &self.data().url
    }
}

/// Downcast a shared page to its concrete type
pub fn downcast_page<T: Page>(page: Arc<dyn Page>) -> Option<Arc<T>> {
    AsAny::into_any_arc(page).downcast::<T>().ok()
}

/// Everything a page factory receives
#[derive(Debug, Clone)]
pub struct PageData {
    /// Parsed body
    pub document: Document,
    /// URL the response came from, after redirects
    pub url: Url,
    /// Positional captures of the matching pattern
    pub groups: Vec<Option<String>>,
    /// Named captures of the matching pattern
    pub params: HashMap<String, String>,
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
}

impl PageData {
    /// Page data for a document, without captures
    pub fn new(document: Document, url: Url) -> Self {
        Self {
            document,
            url,
            groups: Vec::new(),
            params: HashMap::new(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }

    /// Parse a response body as `kind`
    pub fn from_response(kind: DocumentKind, response: &Response) -> Result<Self> {
        let body = response.text_lossy();
        let document = Document::parse(kind, &body, Some(response.url.clone()))?;
        Ok(Self {
            status: response.status,
            headers: response.headers.clone(),
            ..Self::new(document, response.url.clone())
        })
    }

    /// Attach pattern captures
    pub fn with_captures(mut self, groups: Vec<Option<String>>, params: HashMap<String, String>) -> Self {
        self.groups = groups;
        self.params = params;
        self
    }

    /// HTML document, or an error for JSON/raw pages
    pub fn html(&self) -> Result<&HtmlDocument> {
        self.document.as_html().ok_or_else(|| {
            Error::other(format!("{} is not an HTML page ({:?})", self.url, self.document.kind()))
        })
    }

    /// JSON document, or an error for HTML/raw pages
    pub fn json(&self) -> Result<&JsonValue> {
        self.document.as_json().ok_or_else(|| {
            Error::other(format!("{} is not a JSON page ({:?})", self.url, self.document.kind()))
        })
    }

    /// Extraction root
    pub fn root(&self) -> Node {
        self.document.root()
    }

    /// Positional capture, counted from 1 like regex groups
    pub fn group(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.groups.get(i))
            .and_then(|g| g.as_deref())
    }

    /// Named capture
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Run a filter against the document root
    pub fn extract<T: FromValue>(&self, filter: &dyn Filter) -> Result<T> {
        let root = self.root();
        T::from_value(filter.apply(&Context::new(&root))?)
    }

    /// Run a filter against the document root with an environment
    pub fn extract_with<T: FromValue>(&self, filter: &dyn Filter, env: &Env) -> Result<T> {
        let root = self.root();
        T::from_value(filter.apply(&Context::new(&root).with_env(env))?)
    }

    /// First form matching a selector
    pub fn form(&self, selector: &str) -> Result<Form> {
        let element = self
            .html()?
            .query_first(selector)?
            .ok_or_else(|| Error::not_found(selector, self.url.as_str()))?;
        Ok(Form::from_element(&element))
    }
}

/// Page type for bindings that need no behaviour of their own
#[derive(Debug, Clone)]
pub struct GenericPage {
    data: PageData,
    logged: bool,
}

impl GenericPage {
    pub fn new(data: PageData) -> Self {
        Self { data, logged: false }
    }

    /// A page only reachable when logged in
    pub fn logged(data: PageData) -> Self {
        Self { data, logged: true }
    }
}

impl Page for GenericPage {
    fn data(&self) -> &PageData {
        &self.data
    }

    fn logged(&self) -> bool {
        self.logged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::CleanText;
    use bytes::Bytes;

    fn html_data(body: &str) -> PageData {
        let response = Response::new(
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::from(body.to_string()),
            Url::parse("https://bank.test/accounts/42").unwrap(),
        );
        PageData::from_response(DocumentKind::Html, &response).unwrap()
    }

    #[test]
    fn test_captures() {
        let mut params = HashMap::new();
        params.insert("id".to_string(), "42".to_string());
        let data = html_data("<p>x</p>").with_captures(vec![Some("42".into()), None], params);

        assert_eq!(data.group(1), Some("42"));
        assert_eq!(data.group(2), None);
        assert_eq!(data.group(0), None);
        assert_eq!(data.param("id"), Some("42"));
    }

    #[test]
    fn test_extract_and_kind_checks() {
        let data = html_data("<h1> Comptes  courants </h1>");
        let title: String = data.extract(&CleanText::new("h1")).unwrap();
        assert_eq!(title, "Comptes courants");
        assert!(data.json().is_err());
        assert_eq!(data.html().unwrap().query("h1").unwrap().len(), 1);
    }

    #[test]
    fn test_downcast() {
        let page: Arc<dyn Page> = Arc::new(GenericPage::logged(html_data("<p/>")));
        assert!(page.is::<GenericPage>());
        assert!(page.downcast_ref::<GenericPage>().unwrap().logged());
        assert_eq!(page.url().path(), "/accounts/42");
        assert!(downcast_page::<GenericPage>(page).is_some());
    }

    #[test]
    fn test_form_lookup() {
        let data = html_data(r#"<form id="f" action="/go"><input name="a" value="1"></form>"#);
        let form = data.form("form#f").unwrap();
        assert_eq!(form.field("a"), Some("1"));
        assert!(data.form("form#missing").unwrap_err().is_extraction());
    }
}
