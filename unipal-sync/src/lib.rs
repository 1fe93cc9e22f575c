// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # UniPal Sync
//!
//! Repository layer tying the pipeline together:
//!
//! - [`AuthRepository`] - credential persistence and sign-in state
//! - [`TimetableRepository`] - multi-source reconciliation
//!   ([`reconcile`]) with backend storage and cache fallback
//! - [`ClassContentRepository`] - LMS content tree walking and bilingual
//!   deadline parsing ([`parse_datetime_range`])
//! - [`AssignmentRepository`] - discovery, dedup, staging
//! - [`CalendarRepository`] - static campus documents

pub mod assignment;
pub mod auth;
pub mod calendar;
pub mod content;
pub mod error;
pub mod timetable;

pub use assignment::AssignmentRepository;
pub use auth::AuthRepository;
pub use calendar::CalendarRepository;
pub use content::{
    parse_datetime_range, ClassContentRepository, ContentDuration, DateRange, DirectoryContent,
    DirectoryContents,
};
pub use error::SyncError;
pub use timetable::{reconcile, TimetableRepository};
