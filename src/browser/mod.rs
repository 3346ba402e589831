// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Navigation engine and page model
//!
//! A site module declares its pages in a [`PatternSet`], builds a
//! [`Browser`] with its login procedure, and reads data off the current
//! page with the extraction filters.

mod browser;
mod config;
mod dispatch;
mod form;
mod page;
mod recorder;
mod session;
mod two_factor;

pub use browser::{
    Browser, BrowserBuilder, LoggedPredicate, LoginProcedure, LogoutProcedure, SessionGuard,
};
pub use config::{BrowserConfig, DEFAULT_RETRY_STATUSES};
pub use dispatch::{DispatchMatch, PatternSet, Resolution, UrlDispatcher};
pub use form::{Form, FormField};
pub use page::{downcast_page, AsAny, GenericPage, LoadOutcome, Page, PageData};
pub use recorder::{ResponseRecorder, MATCH_INDEX};
pub use session::{Credentials, FailureKind, SessionSnapshot, SessionState, SessionStatus};
pub use two_factor::{SecondFactorHandler, TwoFactor};
