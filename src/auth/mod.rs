//! Authentication for the Nest web API.
//!
//! This module provides:
//! - `Session`: the short-lived JWT plus its expiry
//! - `SessionManager`: lazy, single-flight token refresh
//!
//! Tokens are held in memory only; the long-lived credential is the
//! browser-captured cookie in the config file.

pub mod session;

pub use session::{AuthUrls, Session, SessionManager};
