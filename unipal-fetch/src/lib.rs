// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # UniPal Fetch
//!
//! Authentication and transport plumbing:
//!
//! - [`AuthController`], the single-flight queue over a host-provided
//!   [`BrowsingSurface`] driving the interactive SSO login
//! - [`SessionCookieJar`], the rotten-aware cookie jar
//! - [`Transport`], the HTTP seam with its reqwest-backed production
//!   implementation
//! - [`with_retry`], bounded retry with jittered backoff

pub mod auth;
pub mod cookie;
pub mod credential;
pub mod error;
pub mod http;
pub mod retry;
pub mod surface;

pub use auth::{AuthController, AUTH_TIMEOUT};
pub use cookie::{CookieSet, SessionCookieJar};
pub use credential::Credential;
pub use error::{FetchError, SurfaceError};
pub use http::{
    ClientMode, HttpRequest, HttpResponse, Method, RequestBody, ReqwestTransport, Transport,
    DEFAULT_TIMEOUT,
};
pub use retry::{with_retry, RetryPolicy};
pub use surface::{login_script, BrowsingSurface, SurfaceMessage, SurfaceRequest};
