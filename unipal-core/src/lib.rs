// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # UniPal Core
//!
//! Core types, models, and traits for the UniPal sync pipeline.
//!
//! This crate provides the foundational abstractions used across all other
//! UniPal crates:
//!
//! - Unified domain models ([`Timetable`], [`UnifiedClass`], [`Assignment`])
//! - Academic term calculation ([`Term`])
//! - DTO shapes produced by the external page parsers
//! - The [`PageParser`] seam for injecting those parsers
//! - The error taxonomy shared by model-level code
//! - [`AuthStateBus`], the observable sign-in state

pub mod auth_state;
pub mod error;
pub mod models;
pub mod parser;

pub use auth_state::{AuthState, AuthStateBus};
pub use error::{CoreError, ParseError};
pub use models::{
    day_code, day_index, dedup_hash, slot_token, AlboCalendar, AlboCalendarEvent,
    AlboInformation, AlboNotice, AlboTimetable, AlboTimetableItem, Assignment,
    AssignmentAppData, AssignmentList, ClassAppData, ClassContentEntry, ClassContentListing,
    ClassDetail, ClassDirectory, ClassDirectoryListing, CubicsDay, CubicsPeriod, CubicsSlot,
    CubicsTimetable, DurationRow, ManaboNews, ManaboNewsItem, ManaboPeriod, ManaboSlot,
    ManaboTimetable, MaterialItem, Semester, Term,
    Timetable, UnifiedClass, DEFAULT_CLASS_COLOR,
};
pub use parser::PageParser;
