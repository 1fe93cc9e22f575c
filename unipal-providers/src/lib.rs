// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # UniPal Providers
//!
//! Authenticated fetchers for each upstream system, sharing a
//! [`PortalSession`] per service:
//!
//! - [`ManaboClient`] - the LMS (timetable grid, class content tree, news)
//! - [`CubicsClient`] - the registration system, with
//!   retry-on-invalid-session
//! - [`AlboClient`] - the portal's JSON APIs
//! - [`api::HubApiClient`] - the companion backend (bearer-token REST)

pub mod albo;
pub mod api;
pub mod cubics;
pub mod endpoints;
pub mod error;
pub mod manabo;
pub mod session;

pub use albo::{AlboClient, AlboParsers};
pub use api::{
    AssignmentPatch, AttendanceList, AttendanceRecord, HubApiClient, IdTokenProvider,
    TimetablePatch,
};
pub use cubics::CubicsClient;
pub use endpoints::{PortalEndpoints, ServiceEndpoints};
pub use error::ProviderError;
pub use manabo::{ManaboClient, ManaboParsers};
pub use session::PortalSession;
