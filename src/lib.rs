// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Pagewalk - Declarative Scraping Core
//!
//! Building blocks for website scrapers: a session-holding browser that
//! dispatches every response to a typed page by URL pattern, re-logs in
//! transparently when a page shows the session expired, and a set of
//! composable filters to pull typed values out of HTML and JSON documents.
//!
//! ## Features
//!
//! - URL dispatch: first matching pattern wins, with named captures and `is_here` checks
//! - Session handling: login procedures, re-login on expiry, bounded retries
//! - Two-factor logins and session states that survive a restart
//! - Cookie jar with on-disk persistence
//! - Form extraction and submission
//! - Filters: CleanText, CleanDecimal, dates, regexps, tables, attributes and links
//! - Response recording for pages no pattern knows about
//!
//! ## Example
//!
//! ```rust,no_run
//! use pagewalk::filters::{CleanDecimal, CleanText};
//! use pagewalk::{Browser, BrowserConfig, Credentials, GenericPage, PatternSet};
//! use rust_decimal::Decimal;
//!
//! fn main() -> pagewalk::Result<()> {
//!     let patterns = PatternSet::new()
//!         .html("/login", GenericPage::new)
//!         .html("/accounts", GenericPage::logged);
//!
//!     let browser = Browser::builder(patterns)
//!         .config(BrowserConfig::default().base_url("https://bank.example")?)
//!         .credentials(Credentials::new("user", "secret"))
//!         .login(|browser, creds| {
//!             browser.location("/login")?;
//!             let mut form = browser.lock().page().expect("login page").data().form("form#login")?;
//!             form.set("user", creds.username.as_str()).set("pass", creds.password.as_str());
//!             browser.submit(&form)?;
//!             Ok(())
//!         })
//!         .build()?;
//!
//!     browser.location("/accounts")?;
//!     let page = browser.page().expect("accounts page");
//!     let label: String = page.data().extract(&CleanText::new("td.label"))?;
//!     let balance: Decimal = page.data().extract(&CleanDecimal::new("td.balance"))?;
//!     println!("{}: {}", label, balance);
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod dom;
pub mod error;
pub mod filters;
pub mod http;

// Re-exports for convenience

// Browser and pages
pub use browser::{Browser, BrowserBuilder, BrowserConfig, SessionGuard};
pub use browser::{downcast_page, GenericPage, LoadOutcome, Page, PageData};

// Dispatch
pub use browser::{DispatchMatch, PatternSet, Resolution, UrlDispatcher};

// Session
pub use browser::{Credentials, FailureKind, SessionSnapshot, SessionStatus, TwoFactor};

// Forms
pub use browser::{Form, FormField};

// Recording
pub use browser::ResponseRecorder;

// DOM
pub use dom::{Document, DocumentKind, Element, HtmlDocument, Node};

// Errors
pub use error::{Error, ErrorContext, Result};

// HTTP
pub use http::{Cookie, CookieJar, HttpClient, MockReply, MockTransport, Request, Response, Transport};

// Filters
pub use filters::{Context, Env, Filter, FilterExt, FromValue, Selector, Value};

/// Pagewalk version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
