// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for pagewalk
//!
//! One error enum covers the whole navigation and extraction core. Variants
//! are grouped by kind: transport, dispatch, authentication, extraction and
//! site-reported conditions. Classification helpers let callers react to a
//! kind without matching every variant.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pagewalk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pagewalk
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed at the transport level
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Network failure reported by a transport other than reqwest
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        url: Option<String>,
    },

    /// Transient failures persisted past the retry bound
    #[error("Site unavailable at {url} after {attempts} attempts: {reason}")]
    Unavailable {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// Non-success HTTP status outside the retryable set
    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Base URL is https but the response came back over plain http
    #[error("HTTPS downgrade detected on {url}")]
    HttpsDowngrade { url: String },

    /// No binding matched the response URL (or `is_here` rejected it)
    #[error("No page matches {url}")]
    NoPage {
        url: String,
        saved_to: Option<PathBuf>,
    },

    /// Credentials were refused by the site
    #[error("Incorrect password: {0}")]
    IncorrectPassword(String),

    /// Account locked, expired or banned
    #[error("Account locked: {0}")]
    AccountLocked(String),

    /// A second factor is needed but nobody can answer the site's question
    #[error("Two-factor authentication needs an interactive session")]
    NeedInteractive,

    /// The site asks for a value (SMS code, token...) stored under `field`
    #[error("Site asks for '{field}': {message}")]
    Question { field: String, message: String },

    /// The login must be validated in another application first
    #[error("Waiting for validation: {0}")]
    AppValidation(String),

    /// Session still logged out after the re-login retry
    #[error("Logged out on {url}")]
    LoggedOut { url: String },

    /// Path expression matched nothing
    #[error("No value found for '{selector}' in {context}")]
    NotFound { selector: String, context: String },

    /// Element found but the attribute is missing
    #[error("Element <{element}> has no attribute '{attr}'")]
    MissingAttribute { element: String, attr: String },

    /// None of the candidate column names is registered
    #[error("Unable to find column {0}")]
    MissingColumn(String),

    /// Regular expression did not match
    #[error("Unable to match {pattern} in {text:?}")]
    NoMatch { pattern: String, text: String },

    /// Mapping lookup failed
    #[error("Unable to map {0:?}")]
    Unmapped(String),

    /// Value could not be converted to the requested type
    #[error("Unable to convert {value:?} to {target}")]
    Conversion { value: String, target: &'static str },

    /// Environment entry absent
    #[error("No environment value named '{0}'")]
    MissingEnv(String),

    /// Site is in maintenance mode
    #[error("Site under maintenance: {0}")]
    Maintenance(String),

    /// Site requires a CAPTCHA to be solved
    #[error("CAPTCHA required on {url}")]
    Captcha { url: String },

    /// Site requires a human action (terms to accept, message to read...)
    #[error("Action needed: {0}")]
    ActionNeeded(String),

    /// Any other condition reported by the site itself
    #[error("Site error: {0}")]
    SiteError(String),

    /// Selector parsing error
    #[error("Invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Error::Network(msg.into())
    }

    /// Create a timeout error with URL
    pub fn timeout_with_url(
        operation: impl Into<String>,
        duration_ms: u64,
        url: impl Into<String>,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: Some(url.into()),
        }
    }

    /// Create a selector error
    pub fn selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Selector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    /// Create a not-found extraction error
    pub fn not_found(selector: impl Into<String>, context: impl Into<String>) -> Self {
        Error::NotFound {
            selector: selector.into(),
            context: context.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion(value: impl Into<String>, target: &'static str) -> Self {
        Error::Conversion {
            value: value.into(),
            target,
        }
    }

    /// Create an error reported by the site
    pub fn site<S: Into<String>>(msg: S) -> Self {
        Error::SiteError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if this is a transient transport failure (can retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Timeout { .. } | Error::Network(_) => true,
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Check if this is an authentication failure raised by a login procedure
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::IncorrectPassword(_) | Error::AccountLocked(_))
    }

    /// Check if the site waits for the user to answer a second factor
    pub fn is_interaction(&self) -> bool {
        matches!(self, Error::Question { .. } | Error::AppValidation(_))
    }

    /// Check if this is an extraction failure a filter default may replace
    pub fn is_extraction(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. }
                | Error::MissingAttribute { .. }
                | Error::MissingColumn(_)
                | Error::NoMatch { .. }
                | Error::Unmapped(_)
                | Error::Conversion { .. }
        )
    }

    /// Check if this is a condition reported by the site on one of its pages
    pub fn is_site_condition(&self) -> bool {
        matches!(
            self,
            Error::Maintenance(_)
                | Error::Captcha { .. }
                | Error::ActionNeeded(_)
                | Error::SiteError(_)
        )
    }

    /// Check if the server answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::HttpStatus { status: 404, .. })
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Timeout { url: Some(u), .. } => Some(u),
            Error::Unavailable { url, .. }
            | Error::HttpStatus { url, .. }
            | Error::HttpsDowngrade { url }
            | Error::NoPage { url, .. }
            | Error::LoggedOut { url }
            | Error::Captcha { url } => Some(url),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Attach the URL to timeout errors
    fn with_url(self, url: &str) -> Result<T>;

    /// Prefix the error with an operation description
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn with_url(self, url: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            Error::Timeout {
                operation,
                duration_ms,
                ..
            } => Error::Timeout {
                operation,
                duration_ms,
                url: Some(url.to_string()),
            },
            other => other,
        })
    }

    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| Error::Other(format!("{}: {}", msg, e.into())))
    }
}
