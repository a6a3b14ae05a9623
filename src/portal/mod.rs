//! Authenticated portal access
//!
//! This module provides the request layer every operation protocol is built
//! on:
//! - `PortalClient`: session-header injection, CSRF handling, uniform status
//!   checking
//! - `ApiEnvelope`: the portal's shared JSON response convention
//! - `scrape`: the only markup-coupled extraction code in the crate

pub mod client;
pub mod envelope;
pub mod scrape;

pub use client::{CsrfPolicy, PortalClient, RequestOptions};
pub use envelope::ApiEnvelope;
